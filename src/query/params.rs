use super::ComposeError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Ordered multi-value mapping of request parameter names to values.
///
/// Adding a key that is already present appends the value instead of replacing
/// it, so repeated keys (`mobile=a&mobile=b`) replay in the order they were added.
/// Distinct keys keep their first-insertion order as well, which makes the encoded
/// output deterministic.
pub struct ParamBag {
    entries: Vec<(String, Vec<String>)>,
}

impl ParamBag {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` under `key`.
    ///
    /// Errors with [`ComposeError::EmptyKey`] if `key` is empty; the bag is left untouched.
    pub fn add(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<&mut Self, ComposeError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ComposeError::EmptyKey);
        }
        self.push_unchecked(key, value.into());
        Ok(self)
    }

    /// Merge every pair from `params`, applying [`ParamBag::add`] semantics per pair.
    ///
    /// All keys are checked before anything is inserted, so a rejected call leaves the
    /// bag as it was.
    pub fn add_all<I, K, V>(&mut self, params: I) -> Result<&mut Self, ComposeError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let pairs = params
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect::<Vec<(String, String)>>();
        if pairs.iter().any(|(key, _)| key.is_empty()) {
            return Err(ComposeError::EmptyKey);
        }
        for (key, value) in pairs {
            self.push_unchecked(key, value);
        }
        Ok(self)
    }

    /// Concatenate the contents of `other` onto this bag.
    ///
    /// For a key present in both bags, `other`'s values follow this bag's values in
    /// their original order.
    pub fn extend_from(&mut self, other: &ParamBag) -> &mut Self {
        for (key, values) in &other.entries {
            for value in values {
                self.push_unchecked(key.clone(), value.clone());
            }
        }
        self
    }

    /// First (or only) value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_all(key).first().map(String::as_str)
    }

    /// All values stored under `key`, in insertion order. Empty if the key is absent.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    /// Remove `key` and all of its values. Removing an absent key is a no-op.
    pub fn remove(&mut self, key: &str) -> &mut Self {
        self.entries.retain(|(name, _)| name != key);
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(name, _)| name == key)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over every `(key, value)` pair, one pair per stored value.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries.iter().flat_map(|(key, values)| {
            values
                .iter()
                .map(move |value| (key.as_str(), value.as_str()))
        })
    }

    fn push_unchecked(&mut self, key: String, value: String) {
        match self.entries.iter_mut().find(|(name, _)| *name == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_keys_append_in_insertion_order() {
        let mut bag = ParamBag::new();
        bag.add("mobile", "2347031234567").unwrap();
        bag.add("mobile", "2347030541644").unwrap();
        bag.add("mobile", "2348020000000").unwrap();

        assert_eq!(bag.get("mobile"), Some("2347031234567"));
        assert_eq!(
            bag.get_all("mobile"),
            &["2347031234567", "2347030541644", "2348020000000"]
        );
        assert_eq!(bag.len(), 1);
    }

    #[test]
    fn empty_key_is_rejected_without_mutation() {
        let mut bag = ParamBag::new();
        bag.add("sender", "victor").unwrap();

        assert!(matches!(bag.add("", "x"), Err(ComposeError::EmptyKey)));
        assert!(matches!(
            bag.add_all([("message", "hi"), ("", "oops")]),
            Err(ComposeError::EmptyKey)
        ));
        assert_eq!(bag.len(), 1);
        assert!(!bag.contains("message"));
    }

    #[test]
    fn absent_key_lookups_are_empty() {
        let bag = ParamBag::new();
        assert_eq!(bag.get("key3"), None);
        assert!(bag.get_all("key3").is_empty());
    }

    #[test]
    fn remove_is_idempotent() {
        let mut bag = ParamBag::new();
        bag.add("key1", "value1").unwrap();
        bag.remove("key1").remove("key1").remove("never-added");
        assert!(bag.is_empty());
    }

    #[test]
    fn add_all_accumulates_instead_of_overwriting() {
        let mut bag = ParamBag::new();
        bag.add("key2", "first").unwrap();
        bag.add_all(vec![("key2", "second"), ("key3", "value3")])
            .unwrap();

        assert_eq!(bag.get_all("key2"), &["first", "second"]);
        assert_eq!(bag.get("key3"), Some("value3"));
    }

    #[test]
    fn extend_from_concatenates_in_call_order() {
        let mut left = ParamBag::new();
        left.add("k", "a1").unwrap();
        left.add("k", "a2").unwrap();
        let mut right = ParamBag::new();
        right.add("k", "b1").unwrap();
        right.add("other", "x").unwrap();

        left.extend_from(&right);
        assert_eq!(left.get_all("k"), &["a1", "a2", "b1"]);
        assert_eq!(right.get_all("k"), &["b1"]);

        let pairs = left.pairs().collect::<Vec<_>>();
        assert_eq!(
            pairs,
            vec![("k", "a1"), ("k", "a2"), ("k", "b1"), ("other", "x")]
        );
    }
}
