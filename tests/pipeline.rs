use std::io::{self, Cursor};

use brainfudge::{
    Error, Executor, NodeKind, Program, RuntimeError, StreamIo, SyntaxError, Tape, run_source,
};

const HELLO_WORLD: &str = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";

fn run_with_input(source: &str, cells: usize, input: &str) -> Result<(Tape, Vec<u8>), Error> {
    let program = Program::compile(source)?;
    let tape = Tape::new(cells)?;
    let io = StreamIo::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
    let mut executor = Executor::new(program.tree(), tape, io);
    executor.run()?;
    let (tape, io) = executor.into_parts();
    let (_, output) = io.into_parts();
    Ok((tape, output))
}

#[test]
fn hello_world() {
    let (_, output) = run_with_input(HELLO_WORLD, 32_768, "").unwrap();
    assert_eq!(output, b"Hello World!\n");
}

#[test]
fn comment_only_source_is_a_no_op() {
    let program = Program::compile("just words\n").unwrap();
    assert!(program.tokens().is_empty());
    assert!(program.tree().is_empty());

    let (tape, output) = run_with_input("just words\n", 8, "").unwrap();
    assert!(output.is_empty());
    assert!(tape.cells().iter().all(|&c| c == 0));
    assert_eq!(tape.pointer(), 0);
}

#[test]
fn lone_brackets_are_syntax_errors() {
    assert!(matches!(
        Program::compile("["),
        Err(SyntaxError::UnmatchedLoopOpen { offset: 0 })
    ));
    assert!(matches!(
        Program::compile("]"),
        Err(SyntaxError::UnmatchedLoopClose { offset: 0 })
    ));
}

#[test]
fn tree_mirrors_loop_nesting() {
    let program = Program::compile("+[>[-]<]").unwrap();
    let tree = program.tree();
    let top = tree.children(tree.root());
    assert_eq!(top.len(), 2);
    assert_eq!(tree.kind(top[1]), NodeKind::Loop);

    let body = tree.children(top[1]);
    let kinds: Vec<_> = body.iter().map(|&id| tree.kind(id)).collect();
    assert_eq!(kinds, [NodeKind::MoveRight, NodeKind::Loop, NodeKind::MoveLeft]);
    assert_eq!(tree.parent(body[1]), Some(top[1]));
}

#[test]
fn reverses_a_line_of_input() {
    // Read until newline, then print backwards
    let source = ">,[>,]<[.<]";
    let (_, output) = run_with_input(source, 64, "stressed\n").unwrap();
    assert_eq!(output, b"desserts");
}

#[test]
fn multiplies_with_nested_loops() {
    // 6 * 7 into cell 2
    let (tape, _) = run_with_input("++++++[>+++++++[>+<-]<-]", 3, "").unwrap();
    assert_eq!(tape.cells(), &[0, 0, 42]);
}

#[test]
fn long_nested_loops_run_iteratively() {
    // 255 * 255 inner iterations
    let (tape, _) = run_with_input("-[>-[-]<-]", 2, "").unwrap();
    assert_eq!(tape.cells(), &[0, 0]);
}

#[test]
fn run_source_surfaces_io_failures() {
    struct BrokenPipe;
    impl io::Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let io = StreamIo::new(io::empty(), BrokenPipe);
    let err = run_source("+.", 4, io).unwrap_err();
    assert!(matches!(err, Error::Runtime(RuntimeError::Io { .. })));
}
