/**
 * Client ID generation.
 *
 * The `cid` parameter anonymously identifies a browser, device or app
 * instance. The collector expects a random version 4 UUID in its canonical
 * hyphenated form, e.g. `35009a79-1a05-49d7-b876-2b884d0f825b`.
 */
use uuid::Uuid;

/// Generates a fresh random client ID.
pub fn generate() -> String {
    Uuid::new_v4().hyphenated().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_v4_uuid() {
        let id = generate();
        assert_eq!(id.len(), 36);

        let parsed = Uuid::parse_str(&id).expect("should parse as a UUID");
        assert_eq!(parsed.get_version_num(), 4);
        assert_eq!(parsed.hyphenated().to_string(), id);
    }

    #[test]
    fn test_generate_is_random() {
        assert_ne!(generate(), generate());
    }
}
