use json_lenient::{
    DateValue, DecodeError, DefaultEmptyString, DefaultFalse, Defaulted, EncodeError, FieldCodec,
    Iso8601Strategy, KeyStyle, Keyed, LosslessBool, LosslessValue, LossyMap, LossyVec,
    OptionalDateValue,
};
use serde_json::{json, Map, Value};

// One model exercising every binding family at once, decoded from documents
// with snake_case keys and assorted schema drift.

#[derive(Debug)]
struct Account {
    user_id: LosslessValue<String>,
    display_name: Defaulted<DefaultEmptyString>,
    verified: Defaulted<DefaultFalse>,
    premium: LosslessBool,
    scores: LossyVec<i64>,
    labels: LossyMap<String, String>,
    created_at: DateValue<Iso8601Strategy>,
    deleted_at: OptionalDateValue<Iso8601Strategy>,
}

fn decode_account(doc: &Value) -> Result<Account, DecodeError> {
    let keyed = Keyed::from_node(doc)?.with_style(KeyStyle::SnakeCase);
    Ok(Account {
        user_id: keyed.decode("userId")?,
        display_name: keyed.decode("displayName")?,
        verified: keyed.decode("verified")?,
        premium: keyed.decode("premium")?,
        scores: keyed.decode("scores")?,
        labels: keyed.decode("labels")?,
        created_at: keyed.decode("createdAt")?,
        deleted_at: keyed.decode("deletedAt")?,
    })
}

fn encode_account(account: &Account) -> Result<Value, EncodeError> {
    let mut doc = Map::new();
    doc.insert("user_id".to_string(), account.user_id.encode()?);
    doc.insert("display_name".to_string(), account.display_name.encode());
    doc.insert("verified".to_string(), account.verified.encode());
    doc.insert("premium".to_string(), account.premium.encode()?);
    doc.insert("scores".to_string(), account.scores.encode());
    doc.insert("labels".to_string(), account.labels.encode());
    doc.insert("created_at".to_string(), account.created_at.encode());
    doc.insert("deleted_at".to_string(), account.deleted_at.encode());
    Ok(Value::Object(doc))
}

#[test]
fn lenient_model_matrix_clean_document_decodes_naturally() {
    let doc = json!({
        "user_id": "u-1001",
        "display_name": "Ada",
        "verified": true,
        "premium": false,
        "scores": [10, 20, 30],
        "labels": {"tier": "gold"},
        "created_at": "2019-12-27T22:43:00Z",
        "deleted_at": null,
    });
    let account = decode_account(&doc).expect("clean document must decode");
    assert_eq!(&**account.user_id, "u-1001");
    assert_eq!(&**account.display_name, "Ada");
    assert!(*account.verified);
    assert!(!*account.premium);
    assert_eq!(*account.scores, vec![10, 20, 30]);
    assert_eq!(account.labels.get("tier").map(String::as_str), Some("gold"));
    assert!(account.deleted_at.is_none());

    let encoded = encode_account(&account).expect("clean account must encode");
    assert_eq!(encoded, doc);
}

#[test]
fn lenient_model_matrix_drifted_document_still_decodes() {
    // Numeric id, missing name, null verified, integer premium flag, a
    // corrupt score, a corrupt label value, and an absent deleted_at.
    let doc = json!({
        "user_id": 1001,
        "verified": null,
        "premium": 1,
        "scores": [10, "oops", 30, null],
        "labels": {"tier": "gold", "broken": 7},
        "created_at": "2019-12-27T22:43:00Z",
    });
    let account = decode_account(&doc).expect("drifted document must decode");
    assert_eq!(&**account.user_id, "1001");
    assert_eq!(&**account.display_name, "");
    assert!(!*account.verified);
    assert!(*account.premium);
    assert_eq!(*account.scores, vec![10, 30]);
    assert_eq!(account.labels.len(), 1);
    assert!(account.deleted_at.is_none());

    let encoded = encode_account(&account).expect("drifted account must encode");
    // The numeric id revives as a number, the flag as a real boolean.
    assert_eq!(encoded["user_id"], json!(1001));
    assert_eq!(encoded["premium"], json!(true));
    assert_eq!(encoded["scores"], json!([10, 30]));
    assert_eq!(encoded["display_name"], json!(""));
}

#[test]
fn lenient_model_matrix_lossless_id_does_not_conflict_with_bool_flag() {
    // An integer in a string-typed slot and an integer in a bool-typed slot
    // coexist: each field's own probe order decides.
    let doc = json!({
        "user_id": 1,
        "verified": true,
        "premium": 1,
        "scores": [],
        "labels": {},
        "created_at": "2019-12-27T22:43:00Z",
    });
    let account = decode_account(&doc).expect("document must decode");
    assert_eq!(&**account.user_id, "1");
    assert!(*account.premium);
}

#[test]
fn lenient_model_matrix_required_field_failures_carry_pointers() {
    let doc = json!({
        "user_id": "u-1",
        "verified": true,
        "premium": false,
        "scores": [],
        "labels": {},
        "created_at": 99,
    });
    let err = decode_account(&doc).expect_err("bad created_at must fail");
    assert_eq!(err.pointer(), "/created_at");

    let doc = json!({"user_id": "u-1"});
    let err = decode_account(&doc).expect_err("missing premium must fail");
    assert_eq!(err, DecodeError::key_not_found("premium"));
}

#[test]
fn lenient_model_matrix_defaulted_fields_tolerate_any_shape() {
    // Wrong-typed values in defaulted slots fall back instead of failing.
    let doc = json!({
        "user_id": "u-1",
        "display_name": ["not", "a", "string"],
        "verified": "not a recognized flag either",
        "premium": true,
        "scores": [],
        "labels": {},
        "created_at": "2019-12-27T22:43:00Z",
    });
    let account = decode_account(&doc).expect("document must decode");
    assert_eq!(&**account.display_name, "");
    assert!(!*account.verified);
}

#[test]
fn lenient_model_matrix_snake_case_lookup_spares_map_keys() {
    // The key transform applies to field lookup only; map entry keys come
    // through verbatim, dots and spaces and casing included.
    let doc = json!({
        "user_id": "u-1",
        "verified": false,
        "premium": false,
        "scores": [],
        "labels": {
            "com.example.option": "on",
            "display mode": "dark",
            "MixedCase": "kept",
        },
        "created_at": "2019-12-27T22:43:00Z",
    });
    let account = decode_account(&doc).expect("document must decode");
    let keys: Vec<_> = account.labels.keys().map(String::as_str).collect();
    assert_eq!(keys, ["com.example.option", "display mode", "MixedCase"]);
    assert_eq!(
        account.labels.encode(),
        json!({
            "com.example.option": "on",
            "display mode": "dark",
            "MixedCase": "kept",
        })
    );
}

#[test]
fn lenient_model_matrix_mutated_account_reencodes() {
    let doc = json!({
        "user_id": 7,
        "verified": false,
        "premium": 0,
        "scores": [1],
        "labels": {},
        "created_at": "1996-12-19T16:39:57-08:00",
    });
    let mut account = decode_account(&doc).expect("document must decode");
    *account.user_id = "9".to_string();
    account.scores.push(2);
    let encoded = encode_account(&account).expect("mutated account must encode");
    // The id revives through its integer origin; the source timestamp's
    // offset form replays untouched.
    assert_eq!(encoded["user_id"], json!(9));
    assert_eq!(encoded["premium"], json!(false));
    assert_eq!(encoded["scores"], json!([1, 2]));
    assert_eq!(encoded["created_at"], json!("1996-12-19T16:39:57-08:00"));
}

#[test]
fn lenient_model_matrix_defaulted_date_composition() {
    // A defaulted wrapper around a raw date string composes with a separate
    // strategy-bound field reading the same document.
    #[derive(Debug)]
    struct Event {
        note: Defaulted<DefaultEmptyString>,
        at: DateValue<Iso8601Strategy>,
    }

    let doc = json!({"at": "2008-09-15T10:53:00Z"});
    let keyed = Keyed::from_node(&doc).expect("document is an object");
    let event = Event {
        note: keyed.decode("note").expect("defaulted never fails"),
        at: DateValue::decode_field(&keyed, "at").expect("date must decode"),
    };
    assert_eq!(&**event.note, "");
    assert_eq!(event.at.encode(), json!("2008-09-15T10:53:00Z"));
}
