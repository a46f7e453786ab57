use std::fmt;

// ---Record-----------------------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    key: String,
    payload: String,
    origin: u32,
}

impl Record {
    pub fn new<K: Into<String>, P: Into<String>>(key: K, payload: P, origin: u32) -> Record {
        Record {
            key: key.into(),
            payload: payload.into(),
            origin,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Producer id; never takes part in ordering.
    pub fn origin(&self) -> u32 {
        self.origin
    }

    pub fn into_parts(self) -> (String, String, u32) {
        (self.key, self.payload, self.origin)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} (generated by thread {})",
            self.key, self.payload, self.origin
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Record;

    #[test]
    fn test_record_accessors() {
        let r = Record::new("apple", "red", 3);
        assert_eq!(r.key(), "apple");
        assert_eq!(r.payload(), "red");
        assert_eq!(r.origin(), 3);
        assert_eq!(
            r.into_parts(),
            (String::from("apple"), String::from("red"), 3)
        );
    }

    #[test]
    fn test_record_display() {
        let r = Record::new("kiwi", "qzx", 7);
        assert_eq!(r.to_string(), "kiwi: qzx (generated by thread 7)");
    }
}
