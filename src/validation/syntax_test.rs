#[cfg(test)]
mod additional_syntax_tests {
    use crate::validation::domain::extract_domain;
    use crate::validation::syntax::*;

    #[test]
    fn test_edge_case_quoted_strings() {
        assert!(is_syntactically_valid("\"test\"@example.com"));
        assert!(is_syntactically_valid("\"test.test\"@example.com"));
        assert!(is_syntactically_valid("\"test@test\"@example.com"));
        assert!(is_syntactically_valid("\"test\\\\test\"@example.com"));

        assert!(!is_syntactically_valid("\"test@example.com"));
        assert!(!is_syntactically_valid("test\"@example.com"));
        assert!(!is_syntactically_valid("\"test\\\"@example.com"));
        assert!(!is_syntactically_valid("\"bad\\escape\"@example.com"));
    }

    #[test]
    fn test_domain_literal_edge_cases() {
        assert!(is_syntactically_valid("user@[127.0.0.1]"));
        assert!(is_syntactically_valid("user@[IPv6:::1]"));
        assert!(is_syntactically_valid("user@[IPv6:fe80::1]"));

        assert!(!is_syntactically_valid("user@[300.0.0.1]"));
        assert!(!is_syntactically_valid("user@[IPv6:invalid]"));
        assert!(!is_syntactically_valid("user@[192.168.1]"));
        assert!(!is_syntactically_valid("user@[]"));
    }

    #[test]
    fn test_boundary_lengths() {
        let local = "a".repeat(64);
        let label = "b".repeat(63);
        let domain = format!("{label}.{label}.{}", "c".repeat(61));
        let address = format!("{local}@{domain}");
        assert_eq!(address.len(), 254);
        assert!(is_syntactically_valid(&address));

        let address = format!("{local}a@example.com");
        assert!(!is_syntactically_valid(&address));
    }

    #[test]
    fn test_control_characters() {
        assert!(!is_syntactically_valid("user\n@example.com"));
        assert!(!is_syntactically_valid("user@exam\tple.com"));
        assert!(!is_syntactically_valid("\"tab\there\"@example.com"));
    }

    #[test]
    fn test_syntax_and_extractor_agree() {
        let samples = [
            "simple@example.com",
            "bad-address",
            "\"q@q\"@example.org",
            "user@localhost",
            "two@at@example.com",
            "",
        ];

        for sample in samples {
            assert_eq!(
                is_syntactically_valid(sample),
                extract_domain(sample).is_ok(),
                "{sample}"
            );
        }
    }
}
