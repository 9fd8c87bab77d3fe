use std::ops::Index;

use vista_resources::schema::codebooks::CodebooksDto;
use vista_types::{CodebookName, MetadataTag, VisVersion};

use crate::codebook::Codebook;
use crate::error::VisError;

/// All codebooks of one VIS version, indexable by [`CodebookName`].
#[derive(Debug)]
pub struct Codebooks {
    version: VisVersion,
    books: Vec<Codebook>,
}

impl Codebooks {
    pub(crate) fn new(version: VisVersion, dto: &CodebooksDto) -> Result<Self, VisError> {
        let mut slots: Vec<Option<Codebook>> = Vec::new();
        slots.resize_with(CodebookName::ALL.len(), || None);

        for item in &dto.items {
            let book = Codebook::new(item)?;
            let slot = (book.name() as u8 - 1) as usize;
            slots[slot] = Some(book);
        }

        let mut books = Vec::with_capacity(slots.len());
        for (i, slot) in slots.into_iter().enumerate() {
            match slot {
                Some(book) => books.push(book),
                None => {
                    return Err(VisError::InvalidData(format!(
                        "codebooks payload for {version} is missing {}",
                        CodebookName::ALL[i]
                    )))
                }
            }
        }

        Ok(Self { version, books })
    }

    /// The VIS version this data belongs to.
    pub fn version(&self) -> VisVersion {
        self.version
    }

    /// The codebook for one name.
    pub fn codebook(&self, name: CodebookName) -> &Codebook {
        &self.books[(name as u8 - 1) as usize]
    }

    /// Convenience tag creation through the named codebook.
    pub fn create_tag(&self, name: CodebookName, value: &str) -> Option<MetadataTag> {
        self.codebook(name).create_tag(value)
    }

    /// Iterates all codebooks in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &Codebook> {
        self.books.iter()
    }
}

impl Index<CodebookName> for Codebooks {
    type Output = Codebook;

    fn index(&self, name: CodebookName) -> &Codebook {
        self.codebook(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codebooks() -> Codebooks {
        let dto = vista_resources::codebooks_dto(VisVersion::V3_4a).unwrap();
        Codebooks::new(VisVersion::V3_4a, &dto).unwrap()
    }

    #[test]
    fn test_all_codebooks_present() {
        let codebooks = codebooks();
        for name in CodebookName::ALL {
            assert_eq!(codebooks[name].name(), name);
        }
        assert_eq!(codebooks.iter().count(), CodebookName::ALL.len());
    }

    #[test]
    fn test_index_and_create_tag() {
        let codebooks = codebooks();
        assert!(codebooks[CodebookName::Quantity].has_standard_value("pressure"));
        let tag = codebooks
            .create_tag(CodebookName::Content, "exhaust.gas")
            .unwrap();
        assert_eq!(tag.to_string(), "cnt-exhaust.gas");
    }

    #[test]
    fn test_missing_codebook_is_fatal() {
        let mut dto = vista_resources::codebooks_dto(VisVersion::V3_4a).unwrap();
        dto.items.retain(|c| c.name != "quantities");
        assert!(Codebooks::new(VisVersion::V3_4a, &dto).is_err());
    }
}
