use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};

// Widget ids end up inside `name(id=...)` messages, so no "," "=" or ")".
const PREFIX: &str = "field";

/// Page-unique element id, e.g. `childlist_field_1234`.
pub fn use_random_id_for(element: &str) -> String {
    format!("{element}_{PREFIX}_{}", generate_hash())
}

static COUNTER: AtomicUsize = AtomicUsize::new(1);

fn generate_hash() -> u64 {
    let mut hasher = DefaultHasher::new();
    let counter = COUNTER.fetch_add(1, Ordering::SeqCst);
    counter.hash(&mut hasher);
    hasher.finish()
}
