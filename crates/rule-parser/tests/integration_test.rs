//! 表达式编译集成测试
//!
//! 测试完整的解析、展开、组装、求值工作流。

use rule_parser::{
    assemble, flatten, parse, postfix_order, ExpressionCompiler, LogicalOperator, NodeKind,
    ParserOptions, RuleError, RuleExecutor, RuleRow, SequentialIds, UuidGenerator,
    DEFAULT_MAX_NESTING_DEPTH,
};
use std::collections::HashSet;

const PRODUCTION_EXPRESSION: &str = "(((97126 AND 97350 AND (97838 OR 80118 OR 97418 OR 97422 OR 97430 OR 97564 OR 97640 OR 97632 OR 97536)) OR (((97028 OR 97029 OR 97170 OR 97172) AND (NOT 97180)) AND (97546 OR 97610 OR 97644 OR 97814 OR 97444 OR 97550 OR 97386)) OR ((97344 OR 97346) AND (97418 OR 97422 OR 97430 OR 97632 OR 97546 OR 97564))) AND (NOT 82118) AND (NOT 103086))";

const MIXED_EXPRESSION: &str = r#"(((ABC26 AND DEF50 AND (97GHI OR 80JKL OR 97418)) OR ((97028 OR "97 029") AND (NOT 97180))) AND (NOT "82118"))"#;

/// 校验规则行构成一棵树：恰好一个根，每个 FK 都指向已存在的行
fn assert_single_tree(rows: &[RuleRow]) {
    let names: HashSet<&str> = rows.iter().map(|r| r.rule_name.as_str()).collect();
    assert_eq!(names.len(), rows.len(), "规则名称必须唯一");

    let roots = rows.iter().filter(|r| r.rule_name_fk.is_none()).count();
    assert_eq!(roots, 1);

    for row in rows {
        if let Some(parent) = &row.rule_name_fk {
            assert!(names.contains(parent.as_str()), "未知父规则: {}", parent);
        }
    }
}

/// 去掉括号后的操作符和操作数记号数量
fn surviving_token_count(expression: &str) -> usize {
    postfix_order(expression).unwrap().len()
}

// ==================== 完整工作流测试 ====================

#[test]
fn test_production_expression_flattens_to_single_tree() {
    let mut tree = parse(PRODUCTION_EXPRESSION).unwrap();
    let rows = flatten(&mut tree, "Eligibility", &mut UuidGenerator);

    assert_eq!(rows.len(), surviving_token_count(PRODUCTION_EXPRESSION));
    assert_eq!(rows.len(), tree.len());
    assert_single_tree(&rows);

    let leaves = rows.iter().filter(|r| r.operator.is_none()).count();
    let operators = rows.iter().filter(|r| r.operator.is_some()).count();
    assert_eq!(leaves, operators + 1);
    assert!(rows
        .iter()
        .filter(|r| r.operator.is_some())
        .all(|r| r.expression.is_none()));
}

#[test]
fn test_mixed_codes_and_quoted_literals() {
    let mut tree = parse(MIXED_EXPRESSION).unwrap();
    let rows = flatten(&mut tree, "Eligibility", &mut SequentialIds::new("r"));
    assert_single_tree(&rows);

    let expressions: Vec<&str> = rows
        .iter()
        .filter_map(|r| r.expression.as_deref())
        .collect();
    assert!(expressions.contains(&r#"input1.Contains("ABC26")"#));
    assert!(expressions.contains(&r#"input1.Contains("97 029")"#));
    assert!(expressions.contains(&r#"!input1.Contains("97180")"#));
    assert!(expressions.contains(&r#"!input1.Contains("82118")"#));
}

#[test]
fn test_flatten_assemble_evaluate_agree() {
    let mut tree = parse(PRODUCTION_EXPRESSION).unwrap();
    let rows = flatten(&mut tree, "Eligibility", &mut UuidGenerator);

    let workflows = assemble(&rows, DEFAULT_MAX_NESTING_DEPTH).unwrap();
    assert_eq!(workflows.len(), 1);

    let executor = RuleExecutor::new();
    let cases: [&[&str]; 4] = [
        &["97126", "97350", "97838"],
        &["97126", "97350", "97838", "103086"],
        &["97029", "97644"],
        &["97344", "97632", "82118"],
    ];
    let expected = [true, false, true, false];

    for (codes, expected) in cases.into_iter().zip(expected) {
        let direct = executor.evaluate(&tree, codes).matched;
        let outcomes = executor.evaluate_workflow(&workflows[0], codes).unwrap();

        assert_eq!(direct, expected, "codes: {:?}", codes);
        assert_eq!(outcomes[0].is_success, expected, "codes: {:?}", codes);
        assert_eq!(Some(&outcomes[0].rule_name), tree.root_node().name.as_ref());
    }
}

#[test]
fn test_rows_survive_json_round_trip() {
    let mut tree = parse("97126 AND (97350 OR NOT 97180)").unwrap();
    let rows = flatten(&mut tree, "Eligibility", &mut SequentialIds::new("r"));

    let json = serde_json::to_string(&rows).unwrap();
    let parsed: Vec<RuleRow> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, rows);
}

// ==================== 语法结构测试 ====================

#[test]
fn test_precedence_and_parentheses() {
    assert_eq!(parse("A AND B OR C").unwrap().to_infix(), "((A AND B) OR C)");
    assert_eq!(parse("A OR B AND C").unwrap().to_infix(), "(A OR (B AND C))");
    assert_eq!(parse("(A OR B) AND C").unwrap().to_infix(), "((A OR B) AND C)");
    assert_eq!(parse("A OR B OR C").unwrap().to_infix(), "((A OR B) OR C)");
}

#[test]
fn test_negated_quoted_single_leaf() {
    let mut tree = parse(r#"NOT "97180""#).unwrap();
    let rows = flatten(&mut tree, "Eligibility", &mut UuidGenerator);

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].expression.as_deref(), Some(r#"!input1.Contains("97180")"#));
    assert_eq!(rows[0].operator, None);
    assert_eq!(rows[0].rule_name_fk, None);
}

#[test]
fn test_conjunction_rows() {
    let mut tree = parse("97126 AND 97350").unwrap();
    let rows = flatten(&mut tree, "Eligibility", &mut UuidGenerator);

    assert_eq!(rows[0].operator, Some(LogicalOperator::And));
    assert_eq!(rows[1].expression.as_deref(), Some(r#"input1.Contains("97126")"#));
    assert_eq!(rows[2].expression.as_deref(), Some(r#"input1.Contains("97350")"#));
}

#[test]
fn test_root_children_for_left_associative_chain() {
    let tree = parse("A AND B AND C").unwrap();
    let (left, right) = tree.root_node().children().unwrap();

    assert_eq!(tree.to_infix(), "((A AND B) AND C)");
    assert!(matches!(
        tree.node(left).kind,
        NodeKind::Operator {
            op: LogicalOperator::And,
            ..
        }
    ));
    assert!(matches!(
        &tree.node(right).kind,
        NodeKind::Operand { literal, negated: false } if literal == "C"
    ));
}

// ==================== 命名测试 ====================

#[test]
fn test_names_stable_across_flattens_and_unique_across_parses() {
    let mut first = parse("A AND B").unwrap();
    let rows_a = flatten(&mut first, "W", &mut UuidGenerator);
    let rows_b = flatten(&mut first, "W", &mut UuidGenerator);
    assert_eq!(rows_a, rows_b);

    let mut second = parse("A AND B").unwrap();
    let rows_c = flatten(&mut second, "W", &mut UuidGenerator);
    let first_names: HashSet<_> = rows_a.iter().map(|r| r.rule_name.clone()).collect();
    assert!(rows_c.iter().all(|r| !first_names.contains(&r.rule_name)));
}

#[test]
fn test_pinned_root_name_is_reused() {
    let compiler = ExpressionCompiler::new();
    let mut v1 = compiler.parse_with_root_name("A OR B", "plan-9").unwrap();
    let mut v2 = compiler.parse_with_root_name("A OR B OR C", "plan-9").unwrap();

    let rows_v1 = flatten(&mut v1, "Eligibility", &mut UuidGenerator);
    let rows_v2 = flatten(&mut v2, "Eligibility", &mut UuidGenerator);
    assert_eq!(rows_v1[0].rule_name, "plan-9");
    assert_eq!(rows_v2[0].rule_name, "plan-9");
}

// ==================== 错误处理测试 ====================

#[test]
fn test_malformed_expressions() {
    let cases = [
        "AND 97126",
        "97126 AND",
        "(97126 AND 97350",
        "97126 AND 97350)",
        "97126 97350",
        "",
        "97126 AND \"97350",
        "97126 AND X\"Y",
    ];

    for expression in cases {
        let err = parse(expression).unwrap_err();
        assert!(
            err.is_malformed_expression(),
            "expected malformed error for {:?}, got {}",
            expression,
            err
        );
    }
}

#[test]
fn test_length_limit() {
    let compiler = ExpressionCompiler::with_options(ParserOptions {
        max_expression_len: 32,
        ..Default::default()
    });
    assert!(compiler.parse("97126 AND 97350").is_ok());
    assert!(matches!(
        compiler.parse(PRODUCTION_EXPRESSION),
        Err(RuleError::ExpressionTooLong { .. })
    ));
}

#[test]
fn test_deep_chain_flattens_but_nested_export_is_bounded() {
    let expression = vec!["C"; 10_000].join(" AND ");
    let mut tree = parse(&expression).unwrap();

    let rows = flatten(&mut tree, "Eligibility", &mut UuidGenerator);
    assert_eq!(rows.len(), 19_999);
    assert_single_tree(&rows);
    assert!(RuleExecutor::new().evaluate(&tree, &["C"]).matched);

    assert!(matches!(
        tree.to_workflow("Eligibility", &mut UuidGenerator, DEFAULT_MAX_NESTING_DEPTH),
        Err(RuleError::NestingTooDeep { depth: 10_000, .. })
    ));
    assert!(matches!(
        assemble(&rows, DEFAULT_MAX_NESTING_DEPTH),
        Err(RuleError::NestingTooDeep { .. })
    ));
}
