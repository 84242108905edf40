use celbridge::HostValue;
use once_cell::sync::Lazy;

pub struct Scenario {
    pub name: &'static str,
    pub expr: &'static str,
    pub bindings: Vec<(&'static str, HostValue)>,
    pub expected: HostValue,
}

pub static SCENARIOS: Lazy<Vec<Scenario>> = Lazy::new(|| {
    vec![
        Scenario {
            name: "adult_and_active",
            expr: "age >= 18 && status == 'active'",
            bindings: vec![("age", HostValue::Int(25)), ("status", HostValue::from("active"))],
            expected: HostValue::Bool(true),
        },
        Scenario {
            name: "minor",
            expr: "age >= 18 && status == 'active'",
            bindings: vec![("age", HostValue::Int(12)), ("status", HostValue::from("active"))],
            expected: HostValue::Bool(false),
        },
        Scenario {
            name: "greeting",
            expr: "'Hello, ' + name + '!'",
            bindings: vec![("name", HostValue::from("World"))],
            expected: HostValue::from("Hello, World!"),
        },
        Scenario {
            name: "unicode_greeting",
            expr: "'¡Hola, ' + name + '!'",
            bindings: vec![("name", HostValue::from("世界"))],
            expected: HostValue::from("¡Hola, 世界!"),
        },
        Scenario {
            name: "float_arithmetic",
            expr: "pi * 2.0",
            bindings: vec![("pi", HostValue::Float(1.5))],
            expected: HostValue::Float(3.0),
        },
        Scenario {
            name: "null_literal",
            expr: "null",
            bindings: vec![],
            expected: HostValue::Nil,
        },
        Scenario {
            name: "bytes_passthrough",
            expr: "payload",
            bindings: vec![("payload", HostValue::Bytes(vec![0, 1, 2, 255]))],
            expected: HostValue::Bytes(vec![0, 1, 2, 255]),
        },
        Scenario {
            name: "unsigned_fits",
            expr: "40u + 2u",
            bindings: vec![],
            expected: HostValue::Int(42),
        },
    ]
});

/// Runs a single expression with `name = value` bindings and checks the result.
macro_rules! eval_case {
    ($name:ident, expr: $expr:expr, bindings: { $($var:literal => $value:expr),* $(,)? }, expected: $expected:expr $(,)?) => {
        #[test]
        fn $name() {
            let runtime = celbridge::Runtime::detect().unwrap();
            let mut context = runtime.context();
            $(context.set($var, &$value).unwrap();)*
            let mut program = runtime.program();
            program.compile($expr).unwrap();
            pretty_assertions::assert_eq!(program.execute(&context), $expected);
        }
    };
}
