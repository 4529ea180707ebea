use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw, untrusted lead submission as it arrives from the landing form.
///
/// Every field is kept as a loose JSON value: the form may send strings,
/// numbers, or nothing at all, and the validator decides what is acceptable.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LeadInput {
    #[serde(default)]
    pub nombre: Option<Value>,
    #[serde(default)]
    pub edad: Option<Value>,
    #[serde(default)]
    pub correo: Option<Value>,
}

impl LeadInput {
    /// Builds an input from a decoded JSON body.
    ///
    /// Anything other than an object is treated as an empty submission.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::from_map(map),
            _ => Self::default(),
        }
    }

    /// Builds an input from `application/x-www-form-urlencoded` pairs.
    ///
    /// When a key repeats, the last value wins.
    pub fn from_form_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (std::borrow::Cow<'a, str>, std::borrow::Cow<'a, str>)>,
    {
        let mut input = Self::default();
        for (key, value) in pairs {
            let value = Some(Value::String(value.into_owned()));
            match key.as_ref() {
                "nombre" => input.nombre = value,
                "edad" => input.edad = value,
                "correo" => input.correo = value,
                _ => {}
            }
        }
        input
    }

    fn from_map(mut map: Map<String, Value>) -> Self {
        Self {
            nombre: map.remove("nombre"),
            edad: map.remove("edad"),
            correo: map.remove("correo"),
        }
    }
}

/// A lead that passed validation. Only `validation::validate` constructs one.
///
/// Serializes with the form's field names, which is also the shape the
/// upstream lead API expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedLead {
    #[serde(rename = "nombre")]
    pub(crate) name: String,
    #[serde(rename = "edad")]
    pub(crate) age: u8,
    #[serde(rename = "correo")]
    pub(crate) email: String,
}

impl NormalizedLead {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> u8 {
        self.age
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

impl From<&NormalizedLead> for LeadInput {
    fn from(lead: &NormalizedLead) -> Self {
        Self {
            nombre: Some(Value::String(lead.name.clone())),
            edad: Some(Value::from(lead.age)),
            correo: Some(Value::String(lead.email.clone())),
        }
    }
}

/// Form field that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadField {
    Name,
    Age,
    Email,
}

impl LeadField {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadField::Name => "name",
            LeadField::Age => "age",
            LeadField::Email => "email",
        }
    }
}

/// Row written by the database strategy, echoed back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredLead {
    pub id: i64,
    pub nombre: String,
    pub correo: String,
}

/// Successful outcome of handing a lead to a submission strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// Lead relayed upstream; holds the upstream response body (or `{}`).
    Forwarded(Value),
    /// Lead inserted locally.
    Stored(StoredLead),
}
