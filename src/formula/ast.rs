use std::f64::consts::{E, PI, TAU};

/// Single-argument functions a formula may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryFn {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Exp,
    Ln,
    Log2,
    Log10,
    Sqrt,
    Cbrt,
    Abs,
    Floor,
    Ceil,
    Round,
    Sign,
}

/// Two-argument functions a formula may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryFn {
    Pow,
    Min,
    Max,
    Atan2,
    Mod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// What a bare name in a formula refers to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Name {
    Time,
    Constant(f64),
    Unary(UnaryFn),
    Binary(BinaryFn),
}

impl Name {
    /// Resolve a name against the whitelist. `Math.` prefixes are accepted
    /// so formulas written as `Math.sin(2 * Math.PI * t)` keep working.
    pub fn lookup(raw: &str) -> Option<Self> {
        let name = raw.strip_prefix("Math.").unwrap_or(raw);
        let resolved = match name {
            "t" => Name::Time,
            "pi" | "PI" | "π" => Name::Constant(PI),
            "tau" | "TAU" => Name::Constant(TAU),
            "e" | "E" => Name::Constant(E),
            "sin" => Name::Unary(UnaryFn::Sin),
            "cos" => Name::Unary(UnaryFn::Cos),
            "tan" => Name::Unary(UnaryFn::Tan),
            "asin" => Name::Unary(UnaryFn::Asin),
            "acos" => Name::Unary(UnaryFn::Acos),
            "atan" => Name::Unary(UnaryFn::Atan),
            "sinh" => Name::Unary(UnaryFn::Sinh),
            "cosh" => Name::Unary(UnaryFn::Cosh),
            "tanh" => Name::Unary(UnaryFn::Tanh),
            "exp" => Name::Unary(UnaryFn::Exp),
            "ln" | "log" => Name::Unary(UnaryFn::Ln),
            "log2" => Name::Unary(UnaryFn::Log2),
            "log10" => Name::Unary(UnaryFn::Log10),
            "sqrt" => Name::Unary(UnaryFn::Sqrt),
            "cbrt" => Name::Unary(UnaryFn::Cbrt),
            "abs" => Name::Unary(UnaryFn::Abs),
            "floor" => Name::Unary(UnaryFn::Floor),
            "ceil" => Name::Unary(UnaryFn::Ceil),
            "round" => Name::Unary(UnaryFn::Round),
            "sign" => Name::Unary(UnaryFn::Sign),
            "pow" => Name::Binary(BinaryFn::Pow),
            "min" => Name::Binary(BinaryFn::Min),
            "max" => Name::Binary(BinaryFn::Max),
            "atan2" => Name::Binary(BinaryFn::Atan2),
            "mod" => Name::Binary(BinaryFn::Mod),
            _ => return None,
        };
        Some(resolved)
    }
}

/// Typed expression tree of a parsed formula. Constants are folded into
/// `Number` during parsing; `t` is the only free variable.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Time,
    Neg(Box<Expr>),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        func: UnaryFn,
        arg: Box<Expr>,
    },
    Call2 {
        func: BinaryFn,
        a: Box<Expr>,
        b: Box<Expr>,
    },
}

impl Expr {
    /// Evaluate at time `t`. Domain errors surface as NaN or infinity; the
    /// caller decides what a non-finite result means.
    pub fn eval(&self, t: f64) -> f64 {
        match self {
            Expr::Number(n) => *n,
            Expr::Time => t,
            Expr::Neg(inner) => -inner.eval(t),
            Expr::Binary { op, lhs, rhs } => {
                let (l, r) = (lhs.eval(t), rhs.eval(t));
                match op {
                    BinOp::Add => l + r,
                    BinOp::Sub => l - r,
                    BinOp::Mul => l * r,
                    BinOp::Div => l / r,
                    BinOp::Pow => l.powf(r),
                }
            }
            Expr::Unary { func, arg } => func.apply(arg.eval(t)),
            Expr::Call2 { func, a, b } => func.apply(a.eval(t), b.eval(t)),
        }
    }

    /// True when the expression does not depend on `t`.
    pub fn is_constant(&self) -> bool {
        match self {
            Expr::Number(_) => true,
            Expr::Time => false,
            Expr::Neg(inner) => inner.is_constant(),
            Expr::Binary { lhs, rhs, .. } => lhs.is_constant() && rhs.is_constant(),
            Expr::Unary { arg, .. } => arg.is_constant(),
            Expr::Call2 { a, b, .. } => a.is_constant() && b.is_constant(),
        }
    }
}

impl UnaryFn {
    pub fn apply(self, x: f64) -> f64 {
        match self {
            UnaryFn::Sin => x.sin(),
            UnaryFn::Cos => x.cos(),
            UnaryFn::Tan => x.tan(),
            UnaryFn::Asin => x.asin(),
            UnaryFn::Acos => x.acos(),
            UnaryFn::Atan => x.atan(),
            UnaryFn::Sinh => x.sinh(),
            UnaryFn::Cosh => x.cosh(),
            UnaryFn::Tanh => x.tanh(),
            UnaryFn::Exp => x.exp(),
            UnaryFn::Ln => x.ln(),
            UnaryFn::Log2 => x.log2(),
            UnaryFn::Log10 => x.log10(),
            UnaryFn::Sqrt => x.sqrt(),
            UnaryFn::Cbrt => x.cbrt(),
            UnaryFn::Abs => x.abs(),
            UnaryFn::Floor => x.floor(),
            UnaryFn::Ceil => x.ceil(),
            // Halves round toward +inf
            UnaryFn::Round => (x + 0.5).floor(),
            // sign(0) = 0, NaN passes through
            UnaryFn::Sign => {
                if x > 0.0 {
                    1.0
                } else if x < 0.0 {
                    -1.0
                } else {
                    x
                }
            }
        }
    }
}

impl BinaryFn {
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            BinaryFn::Pow => a.powf(b),
            BinaryFn::Min => a.min(b),
            BinaryFn::Max => a.max(b),
            BinaryFn::Atan2 => a.atan2(b),
            BinaryFn::Mod => a % b,
        }
    }
}
