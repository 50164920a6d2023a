use std::fmt;

/// One three-address instruction over the virtual register file.
///
/// Register operands are plain `String`s rather than an interned type
/// because a register name is either a minted `vN`, the reserved `x0`, or a
/// program identifier the rename pass already made globally unique --
/// three disjoint naming schemes that only need to compare equal as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instr {
    /// `rd := rs + imm`
    Addi { rd: String, rs: String, imm: i64 },
    /// `rd := rs + rt`
    Add { rd: String, rs: String, rt: String },
    /// `rd := rs - rt`
    Sub { rd: String, rs: String, rt: String },
    /// `rd := rs * rt`
    Mul { rd: String, rs: String, rt: String },
    /// `rd := rs / rt`
    Div { rd: String, rs: String, rt: String },
    /// `rd := (rs < rt) ? 1 : 0`
    Slt { rd: String, rs: String, rt: String },
    /// `rd := (rs < imm) ? 1 : 0`
    Slti { rd: String, rs: String, imm: i64 },
    /// `rd := rs ^ rt`
    Xor { rd: String, rs: String, rt: String },
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::Addi { rd, rs, imm } => write!(f, "addi {rd}, {rs}, {imm}"),
            Instr::Add { rd, rs, rt } => write!(f, "add {rd}, {rs}, {rt}"),
            Instr::Sub { rd, rs, rt } => write!(f, "sub {rd}, {rs}, {rt}"),
            Instr::Mul { rd, rs, rt } => write!(f, "mul {rd}, {rs}, {rt}"),
            Instr::Div { rd, rs, rt } => write!(f, "div {rd}, {rs}, {rt}"),
            Instr::Slt { rd, rs, rt } => write!(f, "slt {rd}, {rs}, {rt}"),
            Instr::Slti { rd, rs, imm } => write!(f, "slti {rd}, {rs}, {imm}"),
            Instr::Xor { rd, rs, rt } => write!(f, "xor {rd}, {rs}, {rt}"),
        }
    }
}

/// An opaque sink that accepts typed instruction records. `GenVisitor`
/// only ever calls `push`; it never inspects what the sink does with the
/// instruction.
pub trait InstrSink {
    fn push(&mut self, instr: Instr);
}

impl InstrSink for Vec<Instr> {
    fn push(&mut self, instr: Instr) {
        Vec::push(self, instr);
    }
}
