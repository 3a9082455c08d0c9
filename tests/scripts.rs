use std::{cell::RefCell, fs, rc::Rc};

use pretty_assertions::assert_eq;
use wolf404::{Engine, Interpreter, Object};

fn run(input: &str) -> (anyhow::Result<Object>, String) {
    let output = Rc::new(RefCell::new(Vec::<u8>::new()));
    let mut interpreter = Interpreter::with_output(output.clone());
    let result = interpreter.eval(input);
    let printed = String::from_utf8(output.borrow().clone()).unwrap();
    (result, printed)
}

#[test]
fn precedence_scenario_prints_eight() {
    let (result, printed) = run("$a = 2\n$b = 3\nketok($a + $b * 2)");
    assert_eq!(result.unwrap(), Object::Null);
    assert_eq!(printed, "8\n");
}

#[test]
fn javanese_and_english_spellings_mix() {
    let input = r#"
garap greet($name)
    menowo dowo($name) > 3
        balekno "sugeng " + $name
    yenora
        bring "hi " + $name

$names = ["Wolf", "Ani"]
$out = []
$i = 0
baleni $i < len($names)
    plumbungan($out, greet($names[$i]))
    $i = $i + 1
howl($out)
"#;
    let (result, printed) = run(input);
    result.unwrap();
    assert_eq!(printed, "[sugeng Wolf, hi Ani]\n");
}

#[test]
fn classes_print_through_howl() {
    let input = r#"
mold Animal
    hunt init($name)
        this.name = $name
    hunt speak()
        howl(this.name + " makes a sound")

mold Wolf : Animal
    hunt speak()
        howl(this.name + " howls")

$pack = [Animal("Cat"), Wolf("Grey")]
$pack[0].speak()
$pack[1].speak()
isi($pack[1], "alpha", true)
howl($pack[1].alpha)
"#;
    let (result, printed) = run(input);
    result.unwrap();
    assert_eq!(printed, "Cat makes a sound\nGrey howls\ntrue\n");
}

#[test]
fn prowl_output_follows_the_program() {
    let (result, printed) = run("prowl howl(\"later\")\nhowl(\"now\")");
    result.unwrap();
    assert_eq!(printed, "now\nlater\n");
}

#[test]
fn summon_shares_definitions_with_the_caller() {
    let dir = tempfile::tempdir().unwrap();
    let library = dir.path().join("library.wlf");
    fs::write(&library, "hunt shout($s)\n    bring $s + \"!\"\n").unwrap();

    let script = dir.path().join("main.wlf");
    fs::write(
        &script,
        format!(
            "summon \"{}\"\nhowl(shout(\"awoo\"))\n",
            library.display()
        ),
    )
    .unwrap();

    let output = Rc::new(RefCell::new(Vec::<u8>::new()));
    let mut interpreter = Interpreter::with_output(output.clone());
    interpreter.run_file(&script).unwrap();

    assert_eq!(output.borrow().as_slice(), b"awoo!\n");
    assert!(interpreter.env().borrow().get("shout").is_some());
}

#[test]
fn summon_of_missing_file_is_a_runtime_error() {
    let (result, printed) = run("howl(1)\nsummon \"a.wlf\"\nhowl(2)");
    let err = result.unwrap_err();
    assert!(
        err.to_string().starts_with("could not summon a.wlf: "),
        "{}",
        err
    );
    assert_eq!(printed, "1\n");
}

#[test]
fn file_builtins_round_trip_below_working_directory() {
    let dir = tempfile::Builder::new().tempdir_in(".").unwrap();
    let path = dir.path().join("notes.txt");
    let path = path.to_str().unwrap();

    let input = format!(
        "nulis_file(\"{path}\", \"first line\")\nhowl(moco_file(\"{path}\"))\nstring_contains(read_file(\"{path}\"), \"first\")"
    );
    let (result, printed) = run(&input);

    assert_eq!(result.unwrap(), Object::Boolean(true));
    assert_eq!(printed, "first line\n");
}

#[test]
fn file_builtins_refuse_escaping_paths() {
    let (result, _) = run("read_file(\"../Cargo.toml\")");
    assert_eq!(
        result.unwrap_err().to_string(),
        "unsafe path: ../Cargo.toml"
    );
}

#[test]
fn engine_renders_results() {
    let tests = vec![
        ("1 + 2", "3"),
        ("1.5 * 2", "3.0"),
        ("\"wolf\" + \"404\"", "wolf404"),
        ("[1, \"two\", nil]", "[1, two, nil]"),
        ("{\"b\": 2, \"a\": 1}", "{a: 1, b: 2}"),
        ("hunt named($a, $b) $a", "hunt named($a, $b)"),
        ("mold Den\n    hunt enter() 1", "mold Den"),
        ("mold Den\n    hunt enter() 1\nDen()", "Den instance"),
        ("len", "builtin function len"),
    ];

    for (input, expected) in tests {
        let mut engine = Interpreter::with_output(Rc::new(RefCell::new(std::io::sink())));
        assert_eq!(engine.run(input).unwrap(), expected, "{}", input);
    }
}
