//! Fake-data document generators

use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::{Fake, Faker};
use serde_json::{json, Value};

/// Generates a person document with fake field values under the given id
pub fn fake_person_document(id: &str) -> Value {
    let name: String = Name().fake();
    let email: String = SafeEmail().fake();
    let age: u8 = (18..90u8).fake();
    let active: bool = Faker.fake();
    json!({
        "id": id,
        "name": name,
        "age": age,
        "email": email,
        "active": active,
    })
}

/// Generates `count` person documents with ids `p0..p{count-1}`
pub fn fake_person_documents(count: usize) -> Vec<Value> {
    (0..count)
        .map(|index| fake_person_document(&format!("p{index}")))
        .collect()
}
