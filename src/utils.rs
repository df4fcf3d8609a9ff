use uuid::Uuid;

use crate::types::Category;

/// Generate a ticket ID: trade prefix plus a short random suffix,
/// e.g. `plb-a1b2c3`.
pub fn generate_id(category: Category) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", category.prefix(), &suffix[..6])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_shape() {
        let id = generate_id(Category::Hvac);
        assert!(id.starts_with("hvc-"));
        assert_eq!(id.len(), "hvc-".len() + 6);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = generate_id(Category::Other);
        let b = generate_id(Category::Other);
        assert_ne!(a, b);
    }
}
