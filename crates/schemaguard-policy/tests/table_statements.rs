use schemaguard_core::{Column, Constraint, ForeignKey, Index, PrimaryKey, Table, UniqueConstraint};
use schemaguard_policy::{PolicyError, TokenPosition, check_table_statements};

fn column(name: &str, db_type: &str) -> Column {
    Column {
        name: name.to_string(),
        alias: None,
        db_type: db_type.to_string(),
        size: None,
        is_nullable: false,
        default: None,
        comment: None,
    }
}

fn table(name: &str, alias: Option<&str>, columns: Vec<Column>, pk: &[&str]) -> Table {
    let mut constraints = Vec::new();
    if !pk.is_empty() {
        constraints.push(Constraint::PrimaryKey(PrimaryKey {
            name: Some(format!("PK_{name}")),
            columns: pk.iter().map(|column| column.to_string()).collect(),
        }));
    }
    Table {
        name: name.to_string(),
        alias: alias.map(str::to_string),
        comment: None,
        columns,
        constraints,
        indexes: Vec::new(),
        has_common_columns: true,
    }
}

fn foreign_key(name: &str) -> Constraint {
    Constraint::ForeignKey(ForeignKey {
        name: Some(name.to_string()),
        columns: vec!["MEMBER_ID".to_string()],
        referenced_schema: "public".to_string(),
        referenced_table: "MEMBER".to_string(),
        referenced_columns: vec!["MEMBER_ID".to_string()],
    })
}

#[test]
fn suffix_condition_reports_bad_tables_once() {
    let statements = ["if tableName is suffix:_ID then bad"];
    let bad = table("MEMBER_ID", None, vec![column("ID", "integer")], &["ID"]);
    let good = table("MEMBER", Some("Member"), vec![column("MEMBER_ID", "integer")], &["MEMBER_ID"]);

    let violations = check_table_statements(&bad, &statements).unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].message, "The table is no good: MEMBER_ID");
    assert_eq!(violations[0].target, "MEMBER_ID");

    assert!(check_table_statements(&good, &statements).unwrap().is_empty());
}

#[test]
fn pk_db_type_condition_holds_when_any_column_matches() {
    let statements = ["if pkDbType is char then bad"];
    let mixed = table(
        "PURCHASE_PAYMENT",
        None,
        vec![column("PURCHASE_ID", "bigint"), column("PAYMENT_METHOD_CODE", "char")],
        &["PURCHASE_ID", "PAYMENT_METHOD_CODE"],
    );
    let numeric = table(
        "PURCHASE",
        None,
        vec![column("PURCHASE_ID", "bigint"), column("MEMBER_ID", "integer")],
        &["PURCHASE_ID", "MEMBER_ID"],
    );

    let violations = check_table_statements(&mixed, &statements).unwrap();
    assert_eq!(violations.len(), 1, "consequence must run once per table");
    assert!(check_table_statements(&numeric, &statements).unwrap().is_empty());
}

#[test]
fn pk_db_type_consequence_reports_each_failing_key_column() {
    let statements = ["if tableName is prefix:PURCHASE then pkDbType is bigint"];
    let payment = table(
        "PURCHASE_PAYMENT",
        None,
        vec![
            column("PAYMENT_METHOD_CODE", "char"),
            column("PAYMENT_SEQ", "integer"),
            column("PURCHASE_ID", "bigint"),
        ],
        &["PURCHASE_ID", "PAYMENT_SEQ", "PAYMENT_METHOD_CODE"],
    );

    let violations = check_table_statements(&payment, &statements).unwrap();
    let messages: Vec<&str> = violations.iter().map(|v| v.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "The PK column DB type should be bigint but integer: PURCHASE_PAYMENT",
            "The PK column DB type should be bigint but char: PURCHASE_PAYMENT",
        ]
    );
    assert!(violations.iter().all(|v| v.code == "table_pk_db_type"));
}

#[test]
fn pk_db_type_condition_ignores_alias() {
    let statements = ["if pkDbType is char then bad"];
    let aliased = table("CHAR_TABLE", Some("char"), vec![column("ID", "integer")], &["ID"]);

    assert!(check_table_statements(&aliased, &statements).unwrap().is_empty());
}

#[test]
fn fk_name_assertion_reports_each_failing_key() {
    let statements = ["if tableName is PURCHASE then fkName is prefix:FK_"];
    let mut purchase = table(
        "PURCHASE",
        Some("Purchase"),
        vec![column("PURCHASE_ID", "bigint"), column("MEMBER_ID", "integer")],
        &["PURCHASE_ID"],
    );
    purchase.constraints.push(foreign_key("FK_PURCHASE_MEMBER"));
    purchase.constraints.push(foreign_key("PURCHASE_PRODUCT_FK"));
    purchase.constraints.push(foreign_key("REF_PURCHASE_STATUS"));

    let violations = check_table_statements(&purchase, &statements).unwrap();
    let messages: Vec<&str> = violations.iter().map(|v| v.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "The FK constraint name should be prefix:FK_ but PURCHASE_PRODUCT_FK: PURCHASE(Purchase)",
            "The FK constraint name should be prefix:FK_ but REF_PURCHASE_STATUS: PURCHASE(Purchase)",
        ]
    );
    assert!(violations.iter().all(|v| v.code == "table_fk_name"));
}

#[test]
fn member_history_reports_only_missing_common_columns() {
    let statements = [
        "if tableName is suffix:_HISTORY then pkDbType is bigint",
        "if tableName is suffix:_HISTORY then hasCommonColumn",
    ];
    let mut history = table(
        "MEMBER_HISTORY",
        Some("History"),
        vec![column("MEMBER_HISTORY_ID", "bigint")],
        &["MEMBER_HISTORY_ID"],
    );
    history.has_common_columns = false;

    let violations = check_table_statements(&history, &statements).unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(
        violations[0].message,
        "The table should have common columns: MEMBER_HISTORY(History)"
    );
}

#[test]
fn name_assertions_cover_keys_and_indexes() {
    let statements = [
        "if alias is contain:Member then pkName is prefix:PK_",
        "if alias is contain:Member then uniqueName is prefix:UQ_",
        "if alias is contain:Member then indexName is prefix:IX_",
    ];
    let mut member = table("MEMBER", Some("Member"), vec![column("MEMBER_ID", "integer")], &["MEMBER_ID"]);
    member.constraints.push(Constraint::Unique(UniqueConstraint {
        name: None,
        columns: vec!["MEMBER_ID".to_string()],
    }));
    member.indexes.push(Index {
        name: "IX_MEMBER_ACCOUNT".to_string(),
        is_unique: false,
    });
    member.indexes.push(Index {
        name: "MEMBER_BIRTHDATE_IDX".to_string(),
        is_unique: false,
    });

    let violations = check_table_statements(&member, &statements).unwrap();
    let messages: Vec<&str> = violations.iter().map(|v| v.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "The unique constraint name should be prefix:UQ_ but null: MEMBER(Member)",
            "The index name should be prefix:IX_ but MEMBER_BIRTHDATE_IDX: MEMBER(Member)",
        ]
    );
}

#[test]
fn alias_and_comment_assertions_skip_missing_values() {
    let statements = [
        "if tableName is prefix:MEMBER then alias is suffix:Member",
        "if tableName is prefix:MEMBER then comment is contain:member",
    ];
    let plain = table("MEMBER_LOGIN", None, vec![column("ID", "integer")], &["ID"]);
    assert!(check_table_statements(&plain, &statements).unwrap().is_empty());

    let mut described = table("MEMBER_LOGIN", Some("Login"), vec![column("ID", "integer")], &["ID"]);
    described.comment = Some("login history".to_string());
    let violations = check_table_statements(&described, &statements).unwrap();
    assert_eq!(violations.len(), 2);
    assert_eq!(
        violations[0].message,
        "The table alias should be suffix:Member but Login: MEMBER_LOGIN(Login)"
    );
    assert_eq!(violations[1].code, "table_comment");
}

#[test]
fn negated_table_name_assertion() {
    let statements = ["if tableName is contain:_ then tableName is not:prefix:TMP_"];
    let temp = table("TMP_MEMBER", None, vec![column("ID", "integer")], &["ID"]);

    let violations = check_table_statements(&temp, &statements).unwrap();
    assert_eq!(
        violations[0].message,
        "The table name should be not:prefix:TMP_ but TMP_MEMBER: TMP_MEMBER"
    );
}

#[test]
fn unknown_if_item_aborts_without_violations() {
    let statements = [
        "if tableName is suffix:_ID then bad",
        "if tableKind is X then bad",
    ];
    let bad = table("MEMBER_ID", None, vec![column("ID", "integer")], &["ID"]);

    let err = check_table_statements(&bad, &statements).unwrap_err();
    match err {
        PolicyError::UnknownRuleToken {
            statement,
            token,
            position,
        } => {
            assert_eq!(token, "tableKind");
            assert_eq!(position, TokenPosition::IfItem);
            assert_eq!(statement, "if tableKind is X then bad");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unknown_then_tokens_are_configuration_errors() {
    let member = table("MEMBER", None, vec![column("ID", "integer")], &["ID"]);

    let err = check_table_statements(&member, &["if tableName is MEMBER then columnCount is 3"])
        .unwrap_err();
    assert!(matches!(
        err,
        PolicyError::UnknownRuleToken { ref token, position: TokenPosition::ThenItem, .. } if token == "columnCount"
    ));

    let err = check_table_statements(&member, &["if tableName is MEMBER then good"]).unwrap_err();
    assert!(matches!(
        err,
        PolicyError::UnknownRuleToken { position: TokenPosition::ThenClause, .. }
    ));
    assert!(err.to_string().contains("unknown then-clause 'good'"));
}

#[test]
fn malformed_statement_is_rejected() {
    let member = table("MEMBER", None, vec![column("ID", "integer")], &["ID"]);
    let err = check_table_statements(&member, &["tableName is MEMBER"]).unwrap_err();
    assert!(matches!(err, PolicyError::MalformedStatement { .. }));
}
