use crate::model::{abs_with_sign, apply_sign};
use crate::Routines;

/// What the abs routine hands back: the value returned in r0 plus the two
/// values it stores through its out-pointers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AbsOutput {
    pub returned: i32,
    pub magnitude: i32,
    pub sign: i32,
}

/// Intermediate values the composite routine leaves behind for inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Diagnostics {
    pub a_multiplicand: i32,
    pub b_multiplier: i32,
    pub a_abs: i32,
    pub a_sign: i32,
    pub b_abs: i32,
    pub b_sign: i32,
    pub init_product: i32,
    pub final_product: i32,
}

impl Diagnostics {
    /// Storage names as the lab handout refers to them.
    pub const FIELD_NAMES: [&'static str; 8] = [
        "a_Multiplicand",
        "b_Multiplier",
        "a_Abs",
        "a_Sign",
        "b_Abs",
        "b_Sign",
        "init_Product",
        "final_Product",
    ];

    pub fn fields(&self) -> [(&'static str, i32); 8] {
        [
            ("a_Multiplicand", self.a_multiplicand),
            ("b_Multiplier", self.b_multiplier),
            ("a_Abs", self.a_abs),
            ("a_Sign", self.a_sign),
            ("b_Abs", self.b_abs),
            ("b_Sign", self.b_sign),
            ("init_Product", self.init_product),
            ("final_Product", self.final_product),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompositeOutput {
    pub final_product: i32,
    pub diagnostics: Diagnostics,
}

/// Working implementation of every routine, computed on the host.
#[derive(Debug, Default)]
pub struct HostRoutines;

impl HostRoutines {
    pub fn new() -> Self {
        Self
    }
}

impl Routines for HostRoutines {
    fn unpack(&mut self, packed: u32) -> (i32, i32) {
        let a = (packed >> 16) as u16 as i16 as i32;
        let b = packed as u16 as i16 as i32;
        (a, b)
    }

    fn abs(&mut self, input: i32) -> AbsOutput {
        let (magnitude, sign) = abs_with_sign(input);
        AbsOutput {
            returned: magnitude,
            magnitude,
            sign,
        }
    }

    fn multiply(&mut self, a: i32, b: i32) -> i32 {
        // 32-bit MUL keeps the low word.
        a.wrapping_mul(b)
    }

    fn fix_sign(&mut self, init_product: i32, sign_a: i32, sign_b: i32) -> i32 {
        apply_sign(init_product, sign_a, sign_b)
    }

    fn composite(&mut self, packed: u32) -> CompositeOutput {
        let (a, b) = self.unpack(packed);
        let abs_a = self.abs(a);
        let abs_b = self.abs(b);
        let init_product = self.multiply(abs_a.magnitude, abs_b.magnitude);
        let final_product = self.fix_sign(init_product, abs_a.sign, abs_b.sign);

        CompositeOutput {
            final_product,
            diagnostics: Diagnostics {
                a_multiplicand: a,
                b_multiplier: b,
                a_abs: abs_a.magnitude,
                a_sign: abs_a.sign,
                b_abs: abs_b.magnitude,
                b_sign: abs_b.sign,
                init_product,
                final_product,
            },
        }
    }
}

/// The unedited starter project: every routine returns zero and stores
/// nothing. Useful for checking how a run full of failures is reported.
#[derive(Debug, Default)]
pub struct TemplateRoutines;

impl TemplateRoutines {
    pub fn new() -> Self {
        Self
    }
}

impl Routines for TemplateRoutines {
    fn unpack(&mut self, _packed: u32) -> (i32, i32) {
        (0, 0)
    }

    fn abs(&mut self, _input: i32) -> AbsOutput {
        AbsOutput::default()
    }

    fn multiply(&mut self, _a: i32, _b: i32) -> i32 {
        0
    }

    fn fix_sign(&mut self, _init_product: i32, _sign_a: i32, _sign_b: i32) -> i32 {
        0
    }

    fn composite(&mut self, _packed: u32) -> CompositeOutput {
        CompositeOutput::default()
    }
}
