use std::collections::HashSet;

use crate::{
    collection::{Document, NitriteId},
    errors::NitriteResult,
};

// Make UniqueStream generic over the iterator type
pub(crate) struct UniqueStream<I>
where
    I: Iterator<Item = NitriteResult<Document>>,
{
    raw_stream: I,
    unique_set: HashSet<NitriteId>,
}

impl<I> UniqueStream<I>
where
    I: Iterator<Item = NitriteResult<Document>>,
{
    pub fn new(raw_stream: I) -> Self {
        // Preallocate with default capacity to reduce allocations during iteration
        UniqueStream {
            raw_stream,
            unique_set: HashSet::with_capacity(128),
        }
    }
}

impl<I> Iterator for UniqueStream<I>
where
    I: Iterator<Item = NitriteResult<Document>>,
{
    type Item = NitriteResult<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.raw_stream.next() {
                Some(document) => {
                    match document {
                        Ok(mut doc) => {
                            // Safely extract document ID with proper error handling
                            match doc.id() {
                                Ok(id) => {
                                    // Check if ID already seen; if not, add to set and return
                                    if self.unique_set.insert(id) {
                                        return Some(Ok(doc));
                                    }
                                    // Document is duplicate, continue to next
                                    continue;
                                }
                                Err(e) => {
                                    // Propagate ID extraction error instead of panicking
                                    log::error!("Failed to extract document ID: {:?}", e);
                                    return Some(Err(e));
                                }
                            }
                        }
                        Err(e) => return Some(Err(e)),
                    }
                }
                None => return None,
            }
        }
    }
}
