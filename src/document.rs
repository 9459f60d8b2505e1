//! Document structure for schema-less indexing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A document is a stored record with named text fields.
///
/// Documents are schema-less: any field name can appear on any document, and
/// every field is analyzed uniformly at index time. The caller assigns the
/// document identifier; re-indexing the same identifier replaces the prior
/// version entirely.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Caller-assigned unique identifier.
    id: String,
    /// The field values for this document.
    fields: HashMap<String, String>,
}

impl Document {
    /// Create a new document with the given identifier and no fields.
    pub fn new<S: Into<String>>(id: S) -> Self {
        Document {
            id: id.into(),
            fields: HashMap::new(),
        }
    }

    /// Get the document identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Add a text field to the document.
    pub fn add_field<N: Into<String>, V: Into<String>>(&mut self, name: N, value: V) {
        self.fields.insert(name.into(), value.into());
    }

    /// Get a field value.
    pub fn get_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|s| s.as_str())
    }

    /// Check if the document has a field.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Get all field values.
    pub fn fields(&self) -> &HashMap<String, String> {
        &self.fields
    }

    /// Take ownership of the field map.
    pub fn into_fields(self) -> HashMap<String, String> {
        self.fields
    }

    /// Get the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Create a builder for constructing documents.
    pub fn builder<S: Into<String>>(id: S) -> DocumentBuilder {
        DocumentBuilder::new(id)
    }
}

/// A builder for constructing documents in a fluent manner.
#[derive(Debug)]
pub struct DocumentBuilder {
    document: Document,
}

impl DocumentBuilder {
    /// Create a new document builder for the given identifier.
    pub fn new<S: Into<String>>(id: S) -> Self {
        DocumentBuilder {
            document: Document::new(id),
        }
    }

    /// Add a text field to the document.
    pub fn add_text<N: Into<String>, V: Into<String>>(mut self, name: N, value: V) -> Self {
        self.document.add_field(name, value);
        self
    }

    /// Build the document.
    pub fn build(self) -> Document {
        self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_creation() {
        let mut doc = Document::new("42");
        assert_eq!(doc.id(), "42");
        assert!(doc.is_empty());

        doc.add_field("name", "Product 42");
        doc.add_field("category", "Electronics");

        assert_eq!(doc.len(), 2);
        assert_eq!(doc.get_field("name"), Some("Product 42"));
        assert!(doc.has_field("category"));
        assert!(doc.get_field("missing").is_none());
    }

    #[test]
    fn test_document_builder() {
        let doc = Document::builder("1")
            .add_text("name", "Product 1")
            .add_text("category", "Books")
            .build();

        assert_eq!(doc.id(), "1");
        assert_eq!(doc.get_field("category"), Some("Books"));
    }

    #[test]
    fn test_document_field_overwrite() {
        let mut doc = Document::new("1");
        doc.add_field("name", "old");
        doc.add_field("name", "new");
        assert_eq!(doc.get_field("name"), Some("new"));
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_document_serde_round_trip() {
        let doc = Document::builder("7").add_text("name", "Widget").build();
        let json = serde_json::to_string(&doc).unwrap();
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(doc, back);
    }
}
