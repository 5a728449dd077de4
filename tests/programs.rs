use std::time::Duration;

use tibasic::interpreter::Interpreter;
use tibasic::number::Number;
use tibasic::screen::{Cell, ScriptedScreen};
use tibasic::value::Value;

fn exact(n: i64) -> Value {
    Value::Scalar(Number::from(n))
}

fn run(program: &str) -> Interpreter<ScriptedScreen> {
    run_with(ScriptedScreen::new(), program)
}

fn run_with(screen: ScriptedScreen, program: &str) -> Interpreter<ScriptedScreen> {
    let mut interp = Interpreter::new(screen);
    interp.run(program).unwrap();
    interp
}

#[test]
fn store() {
    let interp = run("5→A\n{1,2}→L1\n\"HI\"→Str3\n{4,5,6}→LIST");

    assert_eq!(interp.get_var("A"), Some(exact(5)));
    assert_eq!(
        interp.get_var("L₁"),
        Some(Value::List(vec![Number::from(1), Number::from(2)]))
    );
    assert_eq!(interp.get_var("L1"), interp.get_var("L₁"));
    assert_eq!(interp.get_var("Str3"), Some(Value::from("HI")));
    assert_eq!(interp.get_var("ʟLIST").map(|v| v.to_string()), Some("{4 5 6}".into()));
}

#[test]
fn reals_start_at_zero() {
    let interp = run("");
    assert_eq!(interp.get_var("Q"), Some(exact(0)));
    assert_eq!(interp.get_var("θ"), Some(exact(0)));
    assert_eq!(interp.get_var("Str0"), None);
    assert_eq!(interp.get_var("L6"), None);
}

#[test]
fn variables_persist_between_runs() {
    let mut interp = run("2→A");
    interp.run("A*10→B").unwrap();
    assert_eq!(interp.get_var("B"), Some(exact(20)));
}

#[test]
fn disp() {
    let interp = run("Disp 1+1,\"HI\",{1,2}\nDisp \"A\",,\"B\"\nDisp");
    assert_eq!(interp.screen().lines, ["2", "HI", "{1 2}", "A", "", "B"]);
}

#[test]
fn if_else() {
    let program = "If X=1\nDisp \"A\"\nElse\nDisp \"B\"\nEnd\nDisp \"C\"";

    let interp = run(&format!("1→X\n{program}"));
    assert_eq!(interp.screen().lines, ["A", "C"]);

    let interp = run(&format!("2→X\n{program}"));
    assert_eq!(interp.screen().lines, ["B", "C"]);
}

#[test]
fn single_line_if() {
    let interp = run("0→X\nIf X\nDisp 1\nDisp 2");
    assert_eq!(interp.screen().lines, ["2"]);

    let interp = run("If 1\nDisp 1\nDisp 2");
    assert_eq!(interp.screen().lines, ["1", "2"]);
}

#[test]
fn nested_then_blocks() {
    let interp = run(
        "3→N
If N>1
Then
Disp \"BIG\"
If N>5
Then
Disp \"HUGE\"
Else
Disp \"MEDIUM\"
End
End
Disp \"DONE\"",
    );
    assert_eq!(interp.screen().lines, ["BIG", "MEDIUM", "DONE"]);
}

#[test]
fn deep_nesting() {
    let depth = 100_000;
    let program = format!(
        "{}Disp \"DEEP\"\n{}",
        "If 1\nThen\n".repeat(depth),
        "End\n".repeat(depth)
    );
    let interp = run(&program);
    assert_eq!(interp.screen().lines, ["DEEP"]);
}

#[test]
fn then_after_else_runs_every_else_line() {
    let interp = run("0→X\nIf X\nDisp 1\nElse\nThen\nDisp 2\nDisp 3\nEnd");
    assert_eq!(interp.screen().lines, ["2", "3"]);
}

#[test]
fn stop() {
    let interp = run("Disp 1\nStop\nDisp 2");
    assert_eq!(interp.screen().lines, ["1"]);
}

#[test]
fn menu_jumps_to_label() {
    let screen = ScriptedScreen::new().with_choices([1]);
    let interp = run_with(
        screen,
        "Menu(\"PICK\",\"ONE\",A,\"TWO\",B)
Lbl A
Disp \"A\"
Stop
Lbl B
Disp \"B\"",
    );

    assert_eq!(interp.screen().lines, ["B"]);
    assert_eq!(
        interp.screen().menus,
        [("PICK".to_string(), vec!["ONE".to_string(), "TWO".to_string()])]
    );
}

#[test]
fn menu_jump_resumes_after_enclosing_if() {
    let screen = ScriptedScreen::new().with_choices([0]);
    let interp = run_with(
        screen,
        "Menu(\"M\",\"GO\",IN)
Disp \"SKIPPED\"
If 0
Then
Disp \"NO\"
Lbl IN
Disp \"IN\"
End
Disp \"AFTER\"",
    );
    assert_eq!(interp.screen().lines, ["IN", "AFTER"]);
}

#[test]
fn menu_loop() {
    let screen = ScriptedScreen::new().with_choices([0, 0, 1]);
    let interp = run_with(
        screen,
        "0→N
Lbl L
N+1→N
Menu(\"AGAIN?\",\"YES\",L,\"NO\",E)
Lbl E
Disp N",
    );
    assert_eq!(interp.screen().lines, ["3"]);
    assert_eq!(interp.screen().menus.len(), 3);
}

#[test]
fn input() {
    let screen = ScriptedScreen::new().with_inputs(["", "2+3", "7"]);
    let interp = run_with(screen, "Input \"VAL\",A\nInput B\nDisp A+B");

    assert_eq!(interp.get_var("A"), Some(exact(5)));
    assert_eq!(interp.screen().lines, ["VAL2+3", "?7", "12"]);
}

#[test]
fn input_into_string_slot_evaluates_the_line() {
    let screen = ScriptedScreen::new().with_inputs(["\"HI\"", "\"A\"+\"B\""]);
    let interp = run_with(screen, "Input \"NAME\",Str1\nInput Str2");
    assert_eq!(interp.get_var("Str1"), Some(Value::from("HI")));
    assert_eq!(interp.get_var("Str2"), Some(Value::from("AB")));
}

#[test]
fn input_of_wrong_kind_is_rejected() {
    let screen = ScriptedScreen::new().with_inputs(["5"]);
    let mut interp = Interpreter::new(screen);
    assert!(interp.run("Input Str1").is_err());
    assert_eq!(interp.get_var("Str1"), None);
}

#[test]
fn prompt() {
    let screen = ScriptedScreen::new().with_inputs(["1", "{1,2}"]);
    let interp = run_with(screen, "Prompt A,ʟLST");

    assert_eq!(interp.get_var("A"), Some(exact(1)));
    assert_eq!(
        interp.get_var("ʟLST"),
        Some(Value::List(vec![Number::from(1), Number::from(2)]))
    );
    assert_eq!(interp.screen().lines, ["A=?1", "ʟLST=?{1,2}"]);
}

#[test]
fn output() {
    let interp = run("Output(2,3,\"HI\")\nOutput(1,1,1+1)");
    assert_eq!(
        interp.screen().cells,
        [
            Cell {
                row: 2,
                col: 3,
                text: "HI".into()
            },
            Cell {
                row: 1,
                col: 1,
                text: "2".into()
            },
        ]
    );
}

#[test]
fn pause() {
    let interp = run_with(
        ScriptedScreen::new().with_enters(1),
        "Pause \"WAIT\",1.5\nPause",
    );
    assert_eq!(interp.screen().lines, ["WAIT"]);
    assert_eq!(interp.screen().sleeps, [Duration::from_millis(1500)]);
}

#[test]
fn clr_home() {
    let interp = run("Disp 1\nClrHome\nDisp 2");
    assert_eq!(interp.screen().lines, ["2"]);
    assert_eq!(interp.screen().clears, 1);
}

#[test]
fn program_listing_form() {
    let interp = run(":1→A\n:If A\n:Then\n:Disp \"YES\"\n:End");
    assert_eq!(interp.screen().lines, ["YES"]);
}
