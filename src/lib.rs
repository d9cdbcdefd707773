//! `castkit`: composable schemas that cast untyped values into a declared
//! shape and report every validation failure with its path and a localized
//! message.
//!
//! A schema is an immutable value: chaining a rule or setting returns a new
//! schema and leaves the original untouched, so schemas can be built once
//! and shared across threads. Input arrives as a dynamic
//! [`schema::Value`], typically deserialized from YAML.
//!
//! # Examples
//!
//!     use castkit::schema::{Shape, Value, array, number, object, string};
//!
//!     let order = object(
//!         Shape::new()
//!             .field("customer", string().required())
//!             .field("lines", array().of(object(
//!                 Shape::new().field("qty", number().integer().min(1.0)),
//!             ))),
//!     );
//!     let input = Value::from_yaml("{ lines: [{ qty: 2 }, { qty: 0 }] }").unwrap();
//!     let messages: Vec<String> = order.validate(&input).iter().map(|e| e.message()).collect();
//!     assert_eq!(messages, [
//!         "customer is a required field",
//!         "lines.1.qty must be greater than or equal to 1",
//!     ]);

/// Schema construction, casting, validation, and error rendering.
pub mod schema;
