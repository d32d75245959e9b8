//! A `CREATE TABLE` statement parser built with the `grammar!` macro.
//!
//! ```text
//! cargo run --example table_schema < schema.sql
//! ```

use std::io::Read;

use parse_rules::{grammar, Grammar, GrammarError, Map, Value};
use tracing_subscriber::EnvFilter;

fn merge(a: Value, b: Value) -> Value {
    let mut merged = Map::default();
    for value in [a, b] {
        if let Value::Map(map) = value {
            merged.extend(map);
        }
    }
    Value::Map(merged)
}

fn flag(name: &str) -> Value {
    Value::map([(name, Value::Bool(true))])
}

fn unquote(text: Value, quote: &str) -> Value {
    match text {
        Value::Str(text) => Value::Str(text.replace(&quote.repeat(2), quote)),
        other => other,
    }
}

fn index(kind: &str, column: Value) -> Value {
    Value::map([
        ("format", Value::from("index")),
        ("type", Value::from(kind)),
        ("columns", Value::List(vec![column])),
    ])
}

pub fn table_schema() -> Result<Grammar, GrammarError> {
    grammar! {
        #[grammar(initial = "expression")]

        token "(", ")", ",";
        token "CREATE TABLE" = /r"(?i)create\s+table"/;
        token "ON UPDATE" = /r"(?i)on\s+update"/;
        token "DEFAULT CHARSET" = /r"(?i)default\s+charset"/;
        token DEFAULT = /r"(?i)default"/;
        token AUTO_INCREMENT = /r"(?i)auto_increment"/;
        token COMMENT = /r"(?i)comment"/;
        token COLLATE = /r"(?i)collate"/;
        token "PRIMARY KEY" = /r"(?i)primary\s+key"/;
        token "UNIQUE KEY" = /r"(?i)unique\s+key"/;
        token ENGINE = /r"(?i)engine"/;
        token ROW_FORMAT = /r"(?i)row_format"/;
        token ";" = /r";?"/;
        token "=?" = /r"=?"/;

        rule expression {
            "CREATE TABLE" identifier "(" statements ")" options ";" => |table, statements, options| {
                Value::map([("table", table), ("statements", statements), ("options", options)])
            }
        }

        rule identifier {
            /r"`((?:``|[^`])+)`"/ => |identifier| unquote(identifier, "`"),
            name,
        }

        rule name {
            /r"[\w$]+"/,
        }

        rule statements {
            statement "," statements => |a, b| {
                let mut statements = vec![a];
                statements.extend(b.into_list());
                statements
            },
            #[wrap] statement,
        }

        rule statement {
            "PRIMARY KEY" "(" identifier ")" => |column| index("primaryKey", column),
            "UNIQUE KEY" "(" identifier ")" => |column| index("uniqueKey", column),
            identifier function properties => |name, kind, properties| {
                Value::map([
                    ("format", Value::from("column")),
                    ("name", name),
                    ("type", kind),
                    ("properties", properties),
                ])
            },
        }

        rule function {
            name "(" arguments ")" => |name, args| Value::map([("name", name), ("args", args)]),
            name => |name| Value::map([("name", name)]),
        }

        rule arguments {
            argument "," arguments => |a, b| {
                let mut args = vec![a];
                args.extend(b.into_list());
                args
            },
            #[wrap] argument,
            #[wrap] (),
        }

        rule argument {
            scalar,
        }

        rule properties {
            property properties => |a, b| merge(a, b),
            property,
            (),
        }

        rule property {
            /r"(?i)unsigned|zerofill|invisible"/ => |name| {
                flag(&name.as_str().unwrap_or_default().to_lowercase())
            },
            AUTO_INCREMENT => || flag("autoIncrement"),
            DEFAULT value => |value| Value::map([("default", value)]),
            "ON UPDATE" function => |function| Value::map([("onUpdate", function)]),
            comment => |comment| Value::map([("comment", comment)]),
            COLLATE identifier => |collate| Value::map([("collate", collate)]),
            /r"(?i)(not\s+)?null"/ => |not| if not.is_null() { flag("nullable") } else { Value::Map(Map::default()) },
        }

        rule comment {
            COMMENT "=?" /r"'((?:''|[^'])+)'"/ => |comment| unquote(comment, "'"),
            COMMENT "=?" /r#""((?:""|[^"])+)""#/ => |comment| unquote(comment, "\""),
        }

        rule options {
            option options => |a, b| merge(a, b),
            option,
            (),
        }

        rule option {
            ENGINE "=?" value => |engine| Value::map([("engine", engine)]),
            AUTO_INCREMENT "=?" value => |value| Value::map([("autoIncrement", value)]),
            "DEFAULT CHARSET" "=?" value => |charset| Value::map([("defaultCharset", charset)]),
            COLLATE "=?" value => |collate| Value::map([("collate", collate)]),
            ROW_FORMAT "=?" value => |format| Value::map([("rowFormat", format)]),
            comment => |comment| Value::map([("comment", comment)]),
        }

        rule scalar {
            /r#"(?i)\d+|true|false|null|'(?:''|[^'])+'|"(?:""|[^"])+""#/,
        }

        rule value {
            scalar,
            name,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;

    let schema = table_schema()?;
    println!("{}", schema.parse(&input)?);
    Ok(())
}
