//! Record model shared by every store backend.
//!
//! Records are loosely typed JSON objects. The system only ever reads a handful
//! of fields (`id`, `state`, `dealership`, `dealer_id`); everything else is
//! carried through untouched.

use std::fmt;

use serde_json::{Map, Value};

/// A single stored record: a JSON object keyed by field name.
pub type Record = Map<String, Value>;

/// The three record sets served by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Dealerships,
    Reviews,
    Inventory,
}

impl Collection {
    /// Every collection, in seeding order.
    pub const ALL: [Collection; 3] = [
        Collection::Dealerships,
        Collection::Reviews,
        Collection::Inventory,
    ];

    /// Storage name of the collection (table name for the document store).
    pub fn name(self) -> &'static str {
        match self {
            Collection::Dealerships => "dealerships",
            Collection::Reviews => "reviews",
            Collection::Inventory => "inventory",
        }
    }

    /// File name of the fixture that seeds this collection.
    pub fn fixture_file(self) -> &'static str {
        match self {
            Collection::Dealerships => "dealerships.json",
            Collection::Reviews => "reviews.json",
            Collection::Inventory => "car_records.json",
        }
    }

    /// Name of the array field inside the fixture file.
    pub fn fixture_key(self) -> &'static str {
        match self {
            Collection::Dealerships => "dealerships",
            Collection::Reviews => "reviews",
            Collection::Inventory => "cars",
        }
    }

    /// Field holding the record identifier.
    pub fn id_field(self) -> &'static str {
        "id"
    }

    /// Whether `insert` assigns the identifier instead of trusting the payload.
    pub fn assigns_ids(self) -> bool {
        matches!(self, Collection::Reviews)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Strict, type-aware equality between a record field and a query value.
///
/// Numbers compare numerically, strings byte-for-byte, and a number never
/// equals a string. Missing fields and `null` never match.
pub fn field_matches(record: &Record, field: &str, value: &Value) -> bool {
    match (record.get(field), value) {
        (None, _) | (_, Value::Null) | (Some(Value::Null), _) => false,
        (Some(Value::Number(a)), Value::Number(b)) => numbers_equal(a, b),
        (Some(found), expected) => found == expected,
    }
}

fn numbers_equal(a: &serde_json::Number, b: &serde_json::Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// Integer identifier of a record, if it carries one.
pub fn record_id(record: &Record, collection: Collection) -> Option<i64> {
    record.get(collection.id_field()).and_then(Value::as_i64)
}

/// Coerce an optional integer field in place: integer-valued strings such as
/// `"3"` become numbers. Absent fields are left absent.
pub fn coerce_integer_field(record: &mut Record, field: &str) -> Result<(), String> {
    let coerced = match record.get(field) {
        None => return Ok(()),
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => return Ok(()),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
                Value::from(f as i64)
            }
            _ => return Err(format!("`{}` must be an integer", field)),
        },
        Some(Value::String(s)) => match s.trim().parse::<i64>() {
            Ok(i) => Value::from(i),
            Err(_) => return Err(format!("`{}` must be an integer, got {:?}", field, s)),
        },
        Some(_) => return Err(format!("`{}` must be an integer", field)),
    };
    record.insert(field.to_string(), coerced);
    Ok(())
}
