use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Sin,
    Cos,
    Tan,
    Max,
    Min,
    /// Prefix `-` in front of anything but a numeric literal.
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpInfo {
    pub symbol: &'static str,
    pub precedence: u8,
    pub assoc: Assoc,
    pub arity: usize,
}

const fn info(symbol: &'static str, precedence: u8, assoc: Assoc, arity: usize) -> OpInfo {
    OpInfo {
        symbol,
        precedence,
        assoc,
        arity,
    }
}

/// Indexed by `Op as usize`, so the order must follow the enum.
static OPERATORS: [OpInfo; 11] = [
    info("+", 2, Assoc::Left, 2),
    info("-", 2, Assoc::Left, 2),
    info("*", 3, Assoc::Left, 2),
    info("/", 3, Assoc::Left, 2),
    info("^", 4, Assoc::Right, 2),
    info("sin", 5, Assoc::Left, 1),
    info("cos", 5, Assoc::Left, 1),
    info("tan", 5, Assoc::Left, 1),
    info("max", 5, Assoc::Left, 2),
    info("min", 5, Assoc::Left, 2),
    info("-", 6, Assoc::Right, 1),
];

impl Op {
    pub const ALL: [Op; 11] = [
        Op::Add,
        Op::Sub,
        Op::Mul,
        Op::Div,
        Op::Pow,
        Op::Sin,
        Op::Cos,
        Op::Tan,
        Op::Max,
        Op::Min,
        Op::Neg,
    ];

    pub fn info(self) -> &'static OpInfo {
        &OPERATORS[self as usize]
    }

    pub fn symbol(self) -> &'static str {
        self.info().symbol
    }

    pub fn precedence(self) -> u8 {
        self.info().precedence
    }

    pub fn is_right_associative(self) -> bool {
        self.info().assoc == Assoc::Right
    }

    pub fn arity(self) -> usize {
        self.info().arity
    }

    /// Resolves a scanned identifier to one of the named operators.
    pub fn function(name: &str) -> Option<Op> {
        match name {
            "sin" => Some(Op::Sin),
            "cos" => Some(Op::Cos),
            "tan" => Some(Op::Tan),
            "max" => Some(Op::Max),
            "min" => Some(Op::Min),
            _ => None,
        }
    }

    /// Functions and negation come before their operands, so nothing on the
    /// operator stack is ready to be emitted when one of them arrives.
    pub fn is_prefix(self) -> bool {
        matches!(
            self,
            Op::Sin | Op::Cos | Op::Tan | Op::Max | Op::Min | Op::Neg
        )
    }

    /// Whether `self`, sitting on top of the operator stack, must be emitted
    /// before `incoming` is pushed.
    pub fn yields_to(self, incoming: Op) -> bool {
        let (top, new) = (self.precedence(), incoming.precedence());
        top > new || (top == new && !incoming.is_right_associative())
    }
}

impl Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
