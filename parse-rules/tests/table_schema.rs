#[allow(dead_code)]
#[path = "../examples/table_schema.rs"]
mod table_schema;

use parse_rules::{Grammar, Value};
use pretty_assertions::assert_eq;

fn schema() -> Grammar {
    table_schema::table_schema().unwrap()
}

fn map<const N: usize>(entries: [(&str, Value); N]) -> Value {
    Value::map(entries)
}

fn list<const N: usize>(items: [Value; N]) -> Value {
    Value::List(items.into())
}

#[test]
fn minimal_table() {
    let value = schema().parse("CREATE TABLE test (id int)").unwrap();
    assert_eq!(
        value,
        map([
            ("table", "test".into()),
            (
                "statements",
                list([map([
                    ("format", "column".into()),
                    ("name", "id".into()),
                    ("type", map([("name", "int".into())])),
                    ("properties", Value::Null),
                ])])
            ),
            ("options", Value::Null),
        ])
    );
}

#[test]
fn quoted_identifiers() {
    let grammar = schema();
    for (input, table) in [
        ("create table `test-1.23` (a int);", "test-1.23"),
        ("CREATE  TABLE `t``e``s``t` (a int)", "t`e`s`t"),
    ] {
        let value = grammar.parse(input).unwrap();
        assert_eq!(value.get("table"), Some(&Value::from(table)), "{input}");
    }
}

#[test]
fn full_statement() {
    let input = "
        CREATE TABLE `users` (
          `id` int(10) unsigned NOT NULL AUTO_INCREMENT,
          `name` varchar(255) COLLATE utf8mb4_unicode_ci DEFAULT NULL COMMENT 'user''s name',
          `updated_at` timestamp NULL ON UPDATE CURRENT_TIMESTAMP,
          PRIMARY KEY (`id`),
          UNIQUE KEY (`name`)
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COMMENT \"the \"\"users\"\"\";
    ";

    let value = schema().parse(input).unwrap();
    assert_eq!(
        value,
        map([
            ("table", "users".into()),
            (
                "statements",
                list([
                    map([
                        ("format", "column".into()),
                        ("name", "id".into()),
                        ("type", map([("name", "int".into()), ("args", list(["10".into()]))])),
                        (
                            "properties",
                            map([("unsigned", true.into()), ("autoIncrement", true.into())])
                        ),
                    ]),
                    map([
                        ("format", "column".into()),
                        ("name", "name".into()),
                        ("type", map([("name", "varchar".into()), ("args", list(["255".into()]))])),
                        (
                            "properties",
                            map([
                                ("collate", "utf8mb4_unicode_ci".into()),
                                ("default", "NULL".into()),
                                ("comment", "user's name".into()),
                            ])
                        ),
                    ]),
                    map([
                        ("format", "column".into()),
                        ("name", "updated_at".into()),
                        ("type", map([("name", "timestamp".into())])),
                        (
                            "properties",
                            map([
                                ("nullable", true.into()),
                                ("onUpdate", map([("name", "CURRENT_TIMESTAMP".into())])),
                            ])
                        ),
                    ]),
                    map([
                        ("format", "index".into()),
                        ("type", "primaryKey".into()),
                        ("columns", list(["id".into()])),
                    ]),
                    map([
                        ("format", "index".into()),
                        ("type", "uniqueKey".into()),
                        ("columns", list(["name".into()])),
                    ]),
                ])
            ),
            (
                "options",
                map([
                    ("engine", "InnoDB".into()),
                    ("defaultCharset", "utf8mb4".into()),
                    ("comment", "the \"users\"".into()),
                ])
            ),
        ])
    );
}

#[test]
fn function_arguments() {
    let value = schema()
        .parse("CREATE TABLE t (a decimal(10, 2), b enum('x', 'y'), c point())")
        .unwrap();
    let types: Vec<&Value> = value
        .get("statements")
        .and_then(Value::as_list)
        .unwrap()
        .iter()
        .map(|statement| statement.get("type").unwrap())
        .collect();

    assert_eq!(
        types,
        [
            &map([("name", "decimal".into()), ("args", list(["10".into(), "2".into()]))]),
            &map([("name", "enum".into()), ("args", list(["'x'".into(), "'y'".into()]))]),
            &map([("name", "point".into()), ("args", list([]))]),
        ]
    );
}

#[test]
fn malformed_statements() {
    let grammar = schema();

    let err = grammar.parse("CREATE TABLE t (id int,)").unwrap_err();
    assert_eq!(err.to_string(), "unexpected \")\" at offset 23");

    let err = grammar.parse("CREATE VIEW v").unwrap_err();
    assert_eq!(err.to_string(), "unexpected \"CREATE\" at offset 0");
}
