use std::collections::HashMap;

use tintlog_template::{
    compile, enter_marker, exit_marker, strip_color, validate, CompileError, Template, Value,
};

const INTRINSIC: [&str; 6] = ["name", "message", "levelname", "process", "enter", "exit"];

fn fields(pairs: &[(&str, &str)]) -> HashMap<String, Value> {
    let mut map = HashMap::new();
    for name in INTRINSIC {
        map.insert(enter_marker(name), Value::from(""));
        map.insert(exit_marker(name), Value::from(""));
    }
    for (k, v) in pairs {
        map.insert(k.to_string(), Value::from(*v));
    }
    map
}

fn render(raw: &str, values: &HashMap<String, Value>) -> String {
    validate(raw, &INTRINSIC, &[] as &[&str]).unwrap();
    Template::parse(&compile(raw).unwrap())
        .unwrap()
        .render(values)
        .unwrap()
}

#[test]
fn markers_resolve_to_nothing_without_color() {
    let values = fields(&[("levelname", "INFO"), ("name", "svc"), ("message", "started")]);
    assert_eq!(
        render("{levelname} {name}: {message}", &values),
        "INFO svc: started"
    );
}

#[test]
fn single_field_colored() {
    let mut values = fields(&[("levelname", "INFO"), ("name", "svc"), ("message", "started")]);
    values.insert(enter_marker("name"), "\x1b[35m".into());
    values.insert(exit_marker("name"), "\x1b[0m".into());
    assert_eq!(
        render("{levelname} {name}: {message}", &values),
        "INFO \x1b[35msvc\x1b[0m: started"
    );
}

#[test]
fn group_colors_whole_span() {
    let mut values = fields(&[("name", "svc"), ("process", "42")]);
    values.insert(enter_marker("name"), "\x1b[32;1m".into());
    values.insert(exit_marker("name"), "\x1b[0m".into());
    assert_eq!(
        render("{enter}{name}PID[{process}]{exit}", &values),
        "\x1b[32;1msvcPID[42]\x1b[0m"
    );
}

#[test]
fn group_inner_field_palette_is_ignored() {
    let mut values = fields(&[("name", "svc"), ("process", "42")]);
    values.insert(enter_marker("process"), "\x1b[31m".into());
    values.insert(exit_marker("process"), "\x1b[0m".into());
    assert_eq!(
        render("{enter}{name}PID[{process}]{exit}", &values),
        "svcPID[42]"
    );
}

#[test]
fn underscore_field_never_colored() {
    let mut values = fields(&[("name", "svc")]);
    values.insert(enter_marker("name"), "\x1b[35m".into());
    values.insert(exit_marker("name"), "\x1b[0m".into());
    assert_eq!(render("<{_name}>", &values), "<svc>");
}

#[test]
fn group_errors() {
    assert_eq!(compile("{enter}{exit}"), Err(CompileError::EmptyGroup));
    assert_eq!(
        compile("{enter}{a}{enter}{b}{exit}{exit}"),
        Err(CompileError::NestedGroup)
    );
    assert_eq!(compile("{exit}"), Err(CompileError::UnmatchedExit));
    assert_eq!(compile("x{enter}{a}"), Err(CompileError::UnterminatedGroup));
}

#[test]
fn stripped_template_renders_plain() {
    let raw = "{enter}{name}PID[{process}]{exit} {levelname:>7}";
    let plain = strip_color(raw).unwrap();
    assert_eq!(plain, "{name}PID[{process}] {levelname:>7}");

    let values: HashMap<String, Value> = [("name", "svc"), ("process", "1"), ("levelname", "WARNING")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), Value::from(v)))
        .collect();
    assert_eq!(
        Template::parse(&plain).unwrap().render(&values).unwrap(),
        "svcPID[1] WARNING"
    );
}
