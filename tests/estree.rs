use esparse::{Options, parse, parse_module, parse_script};
use serde_json::{Value, json};

fn to_json(src: &str, options: Options) -> Value {
    let program = parse(src, options).unwrap();
    serde_json::to_value(&program).unwrap()
}

fn loc(start: (u32, u32), end: (u32, u32)) -> Value {
    json!({
        "start": { "line": start.0, "column": start.1 },
        "end": { "line": end.0, "column": end.1 },
    })
}

/// Sources covering most of the grammar, used by the structural checks.
const CORPUS: &[&str] = &[
    "var foo, bar;",
    "class A {}",
    "class C { a(){}b(){} static #x = 1; get y() { return this.#x } static { C.z = 1 } }",
    "let { a, b: [c = 1, ...d], ...e } = f; [g, h.i] = [1, 2];",
    "function* gen(a, b = 2, ...rest) { yield a; yield* rest; }",
    "async function f() { for await (const x of xs) await x?.y?.[z]?.(); }",
    "const o = { a, 'b': 1, [c]: 2, get d() {}, set d(v) {}, async *e() {}, ...f };",
    "label: for (let i = 0; i < 10; i++) { if (i) continue label; else break; }",
    "switch (x) { case 1: y(); break; default: z(); }",
    "try { a() } catch ({ message }) { b(message) } finally { c() }",
    "x = a ? b : c, d ?? e, f || g && h, i ** j ** k, typeof l, !m, -n, ++o, p--;",
    "tag`a${b}c${d}e`; `plain`; /re[/]x/giu.test(s); 0x1Fn; .5e3; 'str';",
    "new Foo(...args).bar[baz](qux); (a, b) => a + b; async x => await x;",
    "while (a) do b(); while (c); for (k in o) ; for (v of it) ;",
    "(function () { 'use strict'; return new.target; })();",
];

#[test]
fn class_declaration_with_locations() {
    let options = Options {
        loc: true,
        ..Options::default()
    };
    let expected = json!({
        "type": "Program",
        "start": 0,
        "end": 10,
        "loc": loc((1, 0), (1, 10)),
        "sourceType": "script",
        "body": [{
            "type": "ClassDeclaration",
            "start": 0,
            "end": 10,
            "loc": loc((1, 0), (1, 10)),
            "id": {
                "type": "Identifier",
                "start": 6,
                "end": 7,
                "loc": loc((1, 6), (1, 7)),
                "name": "A",
            },
            "superClass": null,
            "body": {
                "type": "ClassBody",
                "start": 8,
                "end": 10,
                "loc": loc((1, 8), (1, 10)),
                "body": [],
            },
        }],
    });
    assert_eq!(to_json("class A {}", options), expected);
}

#[test]
fn var_declaration_includes_semicolon() {
    let expected = json!({
        "type": "VariableDeclaration",
        "start": 0,
        "end": 13,
        "declarations": [
            {
                "type": "VariableDeclarator",
                "start": 4,
                "end": 7,
                "id": { "type": "Identifier", "start": 4, "end": 7, "name": "foo" },
                "init": null,
            },
            {
                "type": "VariableDeclarator",
                "start": 9,
                "end": 12,
                "id": { "type": "Identifier", "start": 9, "end": 12, "name": "bar" },
                "init": null,
            },
        ],
        "kind": "var",
    });
    assert_eq!(to_json("var foo, bar;", Options::default())["body"][0], expected);
}

#[test]
fn anonymous_class_declaration_is_rejected() {
    assert!(parse_script("class { get constructor() {} }", Options::default()).is_err());
}

#[test]
fn static_prototype_accessor_is_rejected() {
    let err = parse_script("class x { static get prototype() {} }", Options::default()).unwrap_err();
    assert_eq!(err.kind, esparse::ErrorKind::StaticPrototype);
}

#[test]
fn await_depends_on_goal() {
    let program = parse_module("await foo", Options::default()).unwrap();
    let json = serde_json::to_value(&program).unwrap();
    assert_eq!(json["sourceType"], "module");
    assert_eq!(
        json["body"][0]["expression"],
        json!({
            "type": "AwaitExpression",
            "start": 0,
            "end": 9,
            "argument": { "type": "Identifier", "start": 6, "end": 9, "name": "foo" },
        })
    );
    assert!(parse_script("await foo", Options::default()).is_err());
}

#[test]
fn adjacent_methods_without_separator() {
    let json = to_json("class C { a(){}b(){} }", Options::default());
    let body = json["body"][0]["body"]["body"].as_array().unwrap();
    assert_eq!(body.len(), 2);
    assert!(body.iter().all(|m| m["type"] == "MethodDefinition" && m["kind"] == "method"));
    assert_eq!(body[0]["key"]["name"], "a");
    assert_eq!(body[1]["key"]["name"], "b");
}

#[test]
fn options_object_from_json() {
    let options: Options = serde_json::from_value(json!({ "module": true, "ranges": true })).unwrap();
    let json = to_json("export default 1", options);
    assert_eq!(json["body"][0]["type"], "ExportDefaultDeclaration");
    assert_eq!(json["body"][0]["range"], json!([0, 16]));
}

#[test]
fn errors_carry_positions() {
    let err = parse_script("a\n  b c", Options::default()).unwrap_err();
    assert_eq!((err.index, err.line, err.column), (6, 2, 4));
    assert_eq!(err.to_string(), "SyntaxError: Unexpected token 'c' (2:4)");
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["message"], "Unexpected token 'c'");
    assert_eq!(json["index"], 6);
}

#[test]
fn parsing_is_deterministic() {
    for src in CORPUS {
        let first = to_json(src, Options::default());
        let second = to_json(src, Options::default());
        assert_eq!(first, second, "{src}");
    }
}

fn offsets(node: &Value) -> Option<(u64, u64)> {
    Some((node.get("start")?.as_u64()?, node.get("end")?.as_u64()?))
}

/// Every node's span lies inside its parent's.
fn check_containment(node: &Value, parent: (u64, u64), src: &str) {
    match node {
        Value::Array(items) => items.iter().for_each(|item| check_containment(item, parent, src)),
        Value::Object(map) => {
            let own = offsets(node);
            if let Some((start, end)) = own {
                assert!(start <= end, "{src}: inverted span {node}");
                assert!(parent.0 <= start && end <= parent.1, "{src}: {node} escapes {parent:?}");
            }
            for (key, child) in map {
                if key != "loc" {
                    check_containment(child, own.unwrap_or(parent), src);
                }
            }
        }
        _ => {}
    }
}

#[test]
fn spans_nest() {
    for src in CORPUS {
        let json = to_json(src, Options::default());
        check_containment(&json, (0, src.len() as u64), src);
    }
}

#[test]
fn top_level_statements_are_ordered() {
    for src in CORPUS {
        let json = to_json(src, Options::default());
        let spans: Vec<_> = json["body"].as_array().unwrap().iter().filter_map(offsets).collect();
        for pair in spans.windows(2) {
            assert!(pair[0].1 <= pair[1].0, "{src}: {pair:?}");
        }
    }
}

#[test]
fn implied_strict_rejects_sloppy_only_forms() {
    let strict = Options {
        implied_strict: true,
        ..Options::default()
    };
    let sloppy_only = [
        "with (a) {}",
        "010",
        "'\\07'",
        "function f(a, a) {}",
        "delete x;",
        "var eval;",
        "arguments = 1;",
        "var let = 1;",
    ];
    for src in sloppy_only {
        assert!(parse_script(src, Options::default()).is_ok(), "{src}");
        assert!(parse_script(src, strict).is_err(), "{src}");
    }
}

#[test]
fn use_strict_prologue_matches_implied_strict() {
    let src = "'use strict'; var a = 1; function f(b) { return b * 2 }";
    let strict = Options {
        implied_strict: true,
        ..Options::default()
    };
    assert_eq!(to_json(src, Options::default()), to_json(src, strict));
}

fn strip_locations(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.remove("loc");
            map.values_mut().for_each(strip_locations);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_locations),
        _ => {}
    }
}

#[test]
fn locations_only_add_loc_fields() {
    let with_loc = Options {
        loc: true,
        ..Options::default()
    };
    for src in CORPUS {
        let mut located = to_json(src, with_loc);
        strip_locations(&mut located);
        assert_eq!(located, to_json(src, Options::default()), "{src}");
    }
}

/// Non-computed keys and member properties are names, never arbitrary
/// expressions.
fn check_computed(node: &Value, src: &str) {
    match node {
        Value::Object(map) => {
            if map.get("computed") == Some(&Value::Bool(false)) {
                let child = map.get("key").or_else(|| map.get("property"));
                if let Some(child) = child {
                    let kind = child["type"].as_str().unwrap_or_default();
                    let allowed = if map.contains_key("property") {
                        matches!(kind, "Identifier" | "PrivateIdentifier")
                    } else {
                        matches!(kind, "Identifier" | "PrivateIdentifier" | "Literal")
                    };
                    assert!(allowed, "{src}: non-computed {kind} in {node}");
                }
            }
            map.values().for_each(|child| check_computed(child, src));
        }
        Value::Array(items) => items.iter().for_each(|item| check_computed(item, src)),
        _ => {}
    }
}

#[test]
fn computed_flag_matches_key_kind() {
    for src in CORPUS {
        check_computed(&to_json(src, Options::default()), src);
    }
}

#[test]
fn cli_options_cover_module_goal() {
    let json = to_json(
        "import a, { b as c } from 'm'; export { a, c as 'd' };",
        Options {
            module: true,
            ..Options::default()
        },
    );
    assert_eq!(json["body"][0]["specifiers"][1]["imported"]["name"], "b");
    assert_eq!(json["body"][1]["specifiers"][1]["exported"]["value"], "d");
}
