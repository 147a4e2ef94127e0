//! End-to-end tests for model definition and construction.

use std::sync::Arc;

use dynkit_model::{CastError, casts};
use dynkit_model::prelude::*;
use serde_json::json;

fn named(json: serde_json::Value) -> ValueMap {
    match Value::from(json) {
        Value::Map(map) => map,
        other => panic!("expected a map, got {other}"),
    }
}

/// `a: int`, `b: str = "x"`.
fn pair() -> Arc<ModelType> {
    ModelType::builder("Pair")
        .field("a", FieldType::Int)
        .field_with("b", FieldType::Str, FieldOptions::with_default("x"))
        .build()
        .unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// Binding
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn positional_argument_and_default() {
    let model = pair().construct(vec![Value::Int(1)], ValueMap::new()).unwrap();

    assert_eq!(model.get("a").unwrap(), &Value::Int(1));
    assert_eq!(model.get("b").unwrap(), &Value::from("x"));
}

#[test]
fn named_arguments() {
    let model = pair()
        .construct(Vec::new(), named(json!({"a": 1, "b": "y"})))
        .unwrap();

    assert_eq!(model.get("a").unwrap(), &Value::Int(1));
    assert_eq!(model.get("b").unwrap(), &Value::from("y"));
}

#[test]
fn named_overrides_positional() {
    let model = pair()
        .construct(vec![Value::Int(1)], named(json!({"a": 2})))
        .unwrap();

    assert_eq!(model.get("a").unwrap(), &Value::Int(2));
}

#[test]
fn too_many_positional_arguments() {
    let err = pair()
        .construct(vec![Value::Int(1), Value::Int(2), Value::Int(3)], ValueMap::new())
        .unwrap_err();

    match err {
        ModelError::Arity {
            model,
            expected,
            given,
        } => {
            assert_eq!(model, "Pair");
            assert_eq!(expected, 2);
            assert_eq!(given, 3);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn positional_arity_boundary_for_every_field_count() {
    for count in 0..6_usize {
        let ty = (0..count)
            .fold(ModelType::builder(format!("M{count}")), |builder, i| {
                builder.field(format!("f{i}"), FieldType::Int)
            })
            .build()
            .unwrap();
        let args = |n: usize| (0..n).map(|i| Value::Int(i as i64)).collect::<Vec<_>>();

        let model = ty.construct(args(count), ValueMap::new()).unwrap();
        assert_eq!(model.len(), count);
        for (i, value) in model.values().enumerate() {
            assert_eq!(value, &Value::Int(i as i64));
        }

        let err = ty.construct(args(count + 1), ValueMap::new()).unwrap_err();
        assert!(matches!(
            err,
            ModelError::Arity { expected, given, .. } if expected == count && given == count + 1
        ));
    }
}

#[test]
fn from_dict_reproduces_every_declared_field() {
    let ty = ModelType::builder("Record")
        .field("id", FieldType::Int)
        .field("name", FieldType::Str)
        .field("score", FieldType::Float)
        .field("active", FieldType::Bool)
        .field("tags", FieldType::list(FieldType::Str))
        .build()
        .unwrap();
    let inputs = [
        json!({"id": 1, "name": "a", "score": 0.5, "active": true, "tags": []}),
        json!({"id": -7, "name": "", "score": 3, "active": false, "tags": ["x", "y"]}),
        json!({"tags": ["z"], "active": true, "score": 1e3, "name": "c", "id": 0}),
    ];

    for input in inputs {
        let model = ty.from_json(&input).unwrap();
        for (name, value) in &model {
            assert_eq!(value.to_json(), input[name.as_str()]);
        }
        assert_eq!(model.to_json(), input);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Validation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn strict_field_rejects_wrong_type() {
    let ty = ModelType::builder("Counter")
        .field("n", FieldType::Int)
        .build()
        .unwrap();

    let err = ty.from_dict(named(json!({"n": "5"}))).unwrap_err();
    let ModelError::TypeMismatch { field, found, .. } = err else {
        panic!("expected a type mismatch");
    };
    assert_eq!(field, "Counter.n");
    assert_eq!(found, "str");
}

#[test]
fn cast_converts_wrong_type() {
    let ty = ModelType::builder("Counter")
        .field_with("n", FieldType::Int, field().cast(casts::to_int))
        .build()
        .unwrap();

    let model = ty.from_dict(named(json!({"n": "5"}))).unwrap();
    assert_eq!(model.get("n").unwrap(), &Value::Int(5));
}

#[test]
fn failing_cast_reports_field() {
    let ty = ModelType::builder("Counter")
        .field_with("n", FieldType::Int, field().cast(casts::to_int))
        .build()
        .unwrap();

    let err = ty.from_dict(named(json!({"n": "five"}))).unwrap_err();
    assert!(matches!(err, ModelError::Cast { ref field, .. } if field == "Counter.n"));
}

#[test]
fn cast_is_skipped_for_valid_values() {
    let ty = ModelType::builder("Label")
        .field_with(
            "text",
            FieldType::Str,
            field().cast(|_| Err(CastError::new("should not run"))),
        )
        .build()
        .unwrap();

    let model = ty.from_dict(named(json!({"text": "ok"}))).unwrap();
    assert_eq!(model.get("text").unwrap(), &Value::from("ok"));
}

#[test]
fn non_strict_field_keeps_value() {
    let ty = ModelType::builder("Loose")
        .field_with("n", FieldType::Int, field().strict(false))
        .build()
        .unwrap();

    let model = ty.from_dict(named(json!({"n": [1, 2]}))).unwrap();
    assert_eq!(model.get("n").unwrap().as_list().map(<[Value]>::len), Some(2));
}

#[test]
fn container_shapes_are_checked() {
    let ty = ModelType::builder("Tags")
        .field("items", FieldType::list(FieldType::Str))
        .field("scores", FieldType::map(FieldType::Float))
        .build()
        .unwrap();

    assert!(ty
        .from_dict(named(json!({"items": ["a", "b"], "scores": {"a": 1, "b": 0.5}})))
        .is_ok());

    let err = ty
        .from_dict(named(json!({"items": ["a", 2], "scores": {}})))
        .unwrap_err();
    assert!(matches!(err, ModelError::TypeMismatch { ref field, .. } if field == "Tags.items"));
}

#[test]
fn missing_required_field_is_a_mismatch() {
    let err = pair().from_dict(ValueMap::new()).unwrap_err();
    let ModelError::TypeMismatch { field, found, .. } = err else {
        panic!("expected a type mismatch");
    };
    assert_eq!(field, "Pair.a");
    assert_eq!(found, "null");
}

// ─────────────────────────────────────────────────────────────────────────────
// Nested models
// ─────────────────────────────────────────────────────────────────────────────

fn address_namespace() -> ModelNamespace {
    let mut ns = ModelNamespace::new();
    ns.define(
        ModelType::builder("Address")
            .field("city", FieldType::Str)
            .field("zip", FieldType::Int),
    )
    .unwrap();
    ns.define(
        ModelType::builder("Person")
            .field("name", FieldType::Str)
            .field("home", FieldType::forward("Address"))
            .field_with(
                "work",
                FieldType::optional(FieldType::forward("Address")),
                field(),
            ),
    )
    .unwrap();
    ns
}

#[test]
fn nested_model_is_built_from_mapping() {
    let ns = address_namespace();
    let person = ns.get("Person").unwrap();
    let input = json!({"name": "ada", "home": {"city": "London", "zip": 1815}});

    let model = person.from_json(&input).unwrap();

    let home = model.get("home").unwrap().as_model().unwrap();
    assert!(Arc::ptr_eq(home.model_type(), ns.get("Address").unwrap()));
    assert_eq!(home.get("city").unwrap(), &Value::from("London"));
    assert!(model.get("work").unwrap().is_null());
}

#[test]
fn nested_round_trip_reproduces_input() {
    let ns = address_namespace();
    let input = json!({
        "name": "ada",
        "home": {"city": "London", "zip": 1815},
        "work": {"city": "Cambridge", "zip": 1842}
    });

    let model = ns.get("Person").unwrap().from_json(&input).unwrap();

    assert_eq!(model.to_json(), input);
    assert_eq!(serde_json::to_value(&model).unwrap(), input);
}

#[test]
fn nested_errors_propagate() {
    let ns = address_namespace();
    let input = json!({"name": "ada", "home": {"city": "London", "zip": "x"}});

    let err = ns.get("Person").unwrap().from_json(&input).unwrap_err();
    assert!(matches!(err, ModelError::TypeMismatch { ref field, .. } if field == "Address.zip"));
}

#[test]
fn ambiguous_union_is_a_configuration_error() {
    let mut ns = ModelNamespace::new();
    ns.define(ModelType::builder("Cat").field("name", FieldType::Str))
        .unwrap();
    ns.define(ModelType::builder("Dog").field("name", FieldType::Str))
        .unwrap();
    let owner = ns
        .define(ModelType::builder("Owner").field(
            "pet",
            FieldType::union([FieldType::forward("Cat"), FieldType::forward("Dog")]),
        ))
        .unwrap();

    let err = owner
        .from_json(&json!({"pet": {"name": "rex"}}))
        .unwrap_err();
    match err {
        ModelError::Configuration { field, candidates } => {
            assert_eq!(field, "Owner.pet");
            assert_eq!(candidates, "Cat, Dog");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn union_with_single_model_branch_builds_it() {
    let mut ns = ModelNamespace::new();
    let cat = ns
        .define(ModelType::builder("Cat").field("name", FieldType::Str))
        .unwrap();
    let owner = ns
        .define(ModelType::builder("Owner").field(
            "pet",
            FieldType::union([FieldType::Str, FieldType::model(&cat)]),
        ))
        .unwrap();

    let by_name = owner.from_json(&json!({"pet": "tom"})).unwrap();
    assert_eq!(by_name.get("pet").unwrap(), &Value::from("tom"));

    let nested = owner.from_json(&json!({"pet": {"name": "tom"}})).unwrap();
    assert_eq!(
        nested.get("pet").unwrap().as_model().unwrap().model_type().name(),
        "Cat"
    );
}

#[test]
fn self_referential_model() {
    let node = ModelType::builder("Node")
        .field("value", FieldType::Int)
        .field_with(
            "next",
            FieldType::optional(FieldType::forward("Node")),
            field(),
        )
        .build()
        .unwrap();

    let list = node
        .from_json(&json!({"value": 1, "next": {"value": 2, "next": {"value": 3}}}))
        .unwrap();

    assert_eq!(
        list.to_string(),
        "Node(value=1, next=Node(value=2, next=Node(value=3, next=null)))"
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Read interface
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn mapping_view_follows_declaration_order() {
    let model = pair()
        .construct(Vec::new(), named(json!({"b": "y", "a": 1})))
        .unwrap();

    assert_eq!(model.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    assert_eq!(model.len(), 2);
    assert!(model.contains("a"));
    assert!(!model.contains("c"));
    assert!(matches!(
        model.get("c").unwrap_err(),
        ModelError::UnknownField { ref field, .. } if field == "c"
    ));
    assert_eq!(model.to_string(), r#"Pair(a=1, b="y")"#);
}

#[test]
fn equality_requires_same_type_and_values() {
    let ty = pair();
    let one = ty.construct(vec![Value::Int(1)], ValueMap::new()).unwrap();
    let same = ty.construct(vec![Value::Int(1)], ValueMap::new()).unwrap();
    let other_value = ty.construct(vec![Value::Int(2)], ValueMap::new()).unwrap();
    let other_type = pair().construct(vec![Value::Int(1)], ValueMap::new()).unwrap();

    assert_eq!(one, same);
    assert_ne!(one, other_value);
    assert_ne!(one, other_type);
}
