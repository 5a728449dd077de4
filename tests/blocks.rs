use tibasic::block::{parse_program, BlockErrType, Branch, Enclosing, LabelTarget, Node};

fn lines(nodes: &[Node]) -> Vec<&str> {
    nodes
        .iter()
        .map(|node| match node {
            Node::Line { text, .. } => text.as_str(),
            Node::IfElse(_) => "<if>",
        })
        .collect()
}

#[test]
fn if_else_end() {
    let root = parse_program("If X=1\nDisp \"A\"\nElse\nDisp \"B\"\nEnd").unwrap();
    let [Node::IfElse(node)] = root.block.children.as_slice() else {
        panic!("expected a single If, got {:?}", root.block.children);
    };

    assert_eq!(node.condition, "X=1");
    assert_eq!(lines(&node.if_block.children), ["Disp \"A\""]);
    let else_block = node.else_block.as_ref().unwrap();
    assert_eq!(lines(&else_block.children), ["Disp \"B\""]);
}

#[test]
fn single_line_if_closes_itself() {
    let root = parse_program("If X=1\nDisp \"A\"").unwrap();
    let [Node::IfElse(node)] = root.block.children.as_slice() else {
        panic!("expected a single If, got {:?}", root.block.children);
    };
    assert_eq!(lines(&node.if_block.children), ["Disp \"A\""]);
    assert!(node.else_block.is_none());

    let root = parse_program("If X=1\nDisp 1\nDisp 2").unwrap();
    assert_eq!(lines(&root.block.children), ["<if>", "Disp 2"]);
}

#[test]
fn then_block_runs_to_end() {
    let root = parse_program("If 1\nThen\nDisp 1\nDisp 2\nEnd\nDisp 3").unwrap();
    assert_eq!(lines(&root.block.children), ["<if>", "Disp 3"]);
    let Node::IfElse(node) = &root.block.children[0] else {
        panic!()
    };
    assert_eq!(lines(&node.if_block.children), ["Disp 1", "Disp 2"]);
}

#[test]
fn then_less_if_has_single_line_else() {
    let root = parse_program("If 0\nDisp 1\nElse\nDisp 2\nDisp 3").unwrap();
    assert_eq!(lines(&root.block.children), ["<if>", "Disp 3"]);
}

#[test]
fn then_after_else_opens_a_long_else_block() {
    let root = parse_program("If X\nDisp 1\nElse\nThen\nDisp 2\nDisp 3\nEnd\nDisp 4").unwrap();
    assert_eq!(lines(&root.block.children), ["<if>", "Disp 4"]);
    let Node::IfElse(node) = &root.block.children[0] else {
        panic!()
    };
    assert_eq!(lines(&node.if_block.children), ["Disp 1"]);
    let else_block = node.else_block.as_ref().unwrap();
    assert_eq!(lines(&else_block.children), ["Disp 2", "Disp 3"]);

    let root = parse_program("If X\nThen\nDisp 1\nElse\nThen\nDisp 2\nDisp 3\nEnd").unwrap();
    let [Node::IfElse(node)] = root.block.children.as_slice() else {
        panic!("expected a single If, got {:?}", root.block.children);
    };
    let else_block = node.else_block.as_ref().unwrap();
    assert_eq!(lines(&else_block.children), ["Disp 2", "Disp 3"]);
}

#[test]
fn else_block_of_a_then_if_runs_to_end() {
    let root = parse_program("If X\nThen\nDisp 1\nElse\nDisp 2\nDisp 3\nEnd\nDisp 4").unwrap();
    assert_eq!(lines(&root.block.children), ["<if>", "Disp 4"]);
    let Node::IfElse(node) = &root.block.children[0] else {
        panic!()
    };
    let else_block = node.else_block.as_ref().unwrap();
    assert_eq!(lines(&else_block.children), ["Disp 2", "Disp 3"]);
}

#[test]
fn end_closes_the_enclosing_then_block() {
    let root = parse_program("If A\nThen\nIf B\nDisp 1\nEnd\nDisp 2").unwrap();
    assert_eq!(lines(&root.block.children), ["<if>", "Disp 2"]);
    let Node::IfElse(outer) = &root.block.children[0] else {
        panic!()
    };
    assert_eq!(lines(&outer.if_block.children), ["<if>"]);
}

#[test]
fn nested_single_line_ifs_close_together() {
    let root = parse_program("If A\nIf B\nDisp 1\nDisp 2").unwrap();
    assert_eq!(lines(&root.block.children), ["<if>", "Disp 2"]);
    let Node::IfElse(outer) = &root.block.children[0] else {
        panic!()
    };
    assert_eq!(lines(&outer.if_block.children), ["<if>"]);
}

#[test]
fn listing_form_and_blank_lines() {
    let root = parse_program(":Disp 1\n\n   \n:  Disp 2\n").unwrap();
    assert_eq!(lines(&root.block.children), ["Disp 1", "Disp 2"]);
}

#[test]
fn label_targets_record_enclosing_ifs() {
    let root = parse_program(
        "Disp 0
If 1
Then
Disp 1
Else
If 2
Then
Lbl IN
Disp 2
End
End
Lbl TOP",
    )
    .unwrap();

    assert_eq!(
        root.labels["IN"],
        LabelTarget {
            enclosing: vec![
                Enclosing {
                    index: 1,
                    branch: Branch::Else
                },
                Enclosing {
                    index: 0,
                    branch: Branch::If
                },
            ],
            position: 0,
        }
    );
    assert_eq!(
        root.labels["TOP"],
        LabelTarget {
            enclosing: vec![],
            position: 2,
        }
    );

    let frames = root.resolve(&root.labels["IN"]).unwrap();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0].1, 2);
    assert_eq!(lines(&frames[2].0.children), ["Disp 2"]);
}

#[test]
fn label_closes_stale_if() {
    let root = parse_program("If 0\nDisp 1\nLbl A\nDisp 2").unwrap();
    assert_eq!(
        root.labels["A"],
        LabelTarget {
            enclosing: vec![],
            position: 1,
        }
    );
}

#[test]
fn control_flow_errors() {
    let err = |source: &str| parse_program(source).unwrap_err();

    assert_eq!(err("Then").data, BlockErrType::NoOpenIf("Then"));
    assert_eq!(err("Disp 1\nElse").data, BlockErrType::NoOpenIf("Else"));
    assert_eq!(err("End").data, BlockErrType::NoOpenIf("End"));
    assert_eq!(err("If 1\nThen\nThen").data, BlockErrType::Duplicate("Then"));
    assert_eq!(
        err("If 1\nThen\nElse\nElse").data,
        BlockErrType::Duplicate("Else")
    );
    assert_eq!(err("If 1\nDisp 1\nThen").data, BlockErrType::ThenAfterLine);
    assert_eq!(
        err("If 1\nDisp 1\nElse\nDisp 2\nThen").data,
        BlockErrType::ThenAfterLine
    );
    assert_eq!(
        err("Lbl A\nLbl A").data,
        BlockErrType::DuplicateLabel("A".into())
    );
    assert_eq!(err("Lbl").data, BlockErrType::BadLabel("".into()));
    assert_eq!(err("Lbl A B").data, BlockErrType::BadLabel("A B".into()));
}

#[test]
fn errors_carry_line_numbers() {
    let err = parse_program("Disp 1\n\nEnd").unwrap_err();
    assert_eq!(err.line, 3);
    assert_eq!(err.to_string(), "Line 3: 'End' without an open If.");
}
