use crate::collection::{Document, FindPlan, NitriteId};
use crate::common::{
    Convertible, DocumentCursor, JoinedDocumentCursor, Lookup, ProjectedDocumentCursor, Value,
};
use crate::errors::{ErrorKind, NitriteError, NitriteResult};
use crate::repository::NitriteEntity;
use std::marker::PhantomData;

pub struct ObjectCursor<T> {
    cursor: DocumentCursor,
    _phantom: PhantomData<T>,
}

impl<T> ObjectCursor<T>
where
    T: Convertible<Output = T> + NitriteEntity,
{
    pub fn new(cursor: DocumentCursor) -> Self {
        ObjectCursor {
            cursor,
            _phantom: PhantomData,
        }
    }

    pub fn reset(&mut self) {
        self.cursor.reset();
    }
    
    pub fn size(&mut self) -> usize {
        // Reset the underlying cursor to ensure we count from the beginning.
        self.reset();
        let count = self.cursor.size();
        // Reset again for replayability.
        self.reset();
        count
    }

    pub fn first(&mut self) -> Option<NitriteResult<T>> {
        let doc_result = self.cursor.first();
        match doc_result {
            Some(Ok(doc)) => {
                let result = T::from_value(&Value::Document(doc));
                match result {
                    Ok(obj) => Some(Ok(obj)),
                    Err(e) => Some(Err(e)),
                }
            }
            Some(Err(e)) => Some(Err(e)),
            None => None,
        }
    }

    pub fn find_plan(&self) -> Option<&FindPlan> {
        self.cursor.find_plan()
    }

    pub(crate) fn set_find_plan(mut self, find_plan: FindPlan) -> Self {
        self.cursor = self.cursor.set_find_plan(find_plan);
        self
    }

    pub fn join<'a, J: Convertible<Output = J> + NitriteEntity>(
        &'a mut self,
        foreign_cursor: &'a mut ObjectCursor<J>,
        lookup: &'a Lookup,
    ) -> NitriteResult<JoinedObjectCursor<'a, J>> {
        let joined_doc_cursor = self.cursor.join(&mut foreign_cursor.cursor, lookup)?;
        Ok(JoinedObjectCursor::new(joined_doc_cursor))
    }

    pub fn project<P>(&'_ mut self) -> NitriteResult<ProjectedObjectCursor<'_, P>>
    where
        P: Convertible<Output = P> + NitriteEntity + Default,
    {
        ProjectedObjectCursor::new(&mut self.cursor)
    }
    
    /// Returns an iterator that yields `(NitriteId, T)` pairs.
    /// This is useful when you need to update entities after retrieving them,
    /// as it provides the NitriteId needed for efficient O(1) updates via
    /// `update_by_nitrite_id`.
    pub fn iter_with_id(&mut self) -> ObjectCursorWithId<'_, T> {
        ObjectCursorWithId {
            cursor: &mut self.cursor,
            _phantom: PhantomData,
        }
    }
}

/// An iterator adapter that yields `(NitriteId, T)` pairs from an ObjectCursor.
/// This enables efficient updates after retrieval by providing the NitriteId.
pub struct ObjectCursorWithId<'a, T> {
    cursor: &'a mut DocumentCursor,
    _phantom: PhantomData<T>,
}

impl<'a, T> Iterator for ObjectCursorWithId<'a, T>
where
    T: Convertible<Output = T> + NitriteEntity,
{
    type Item = NitriteResult<(NitriteId, T)>;

    fn next(&mut self) -> Option<Self::Item> {
        let doc_result = self.cursor.next();
        match doc_result {
            Some(Ok(mut doc)) => {
                // Get the NitriteId from the document
                let id = match doc.id() {
                    Ok(id) => id,
                    Err(e) => return Some(Err(e)),
                };
                
                // Convert document to entity
                let result = T::from_value(&Value::Document(doc));
                match result {
                    Ok(obj) => Some(Ok((id, obj))),
                    Err(e) => Some(Err(e)),
                }
            }
            Some(Err(e)) => Some(Err(e)),
            None => None,
        }
    }
}

impl<T> Iterator for ObjectCursor<T>
where
    T: Convertible<Output = T> + NitriteEntity,
{
    type Item = NitriteResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let doc_result = self.cursor.next();
        match doc_result {
            Some(Ok(doc)) => {
                let result = T::from_value(&Value::Document(doc));
                match result {
                    Ok(obj) => Some(Ok(obj)),
                    Err(e) => Some(Err(e)),
                }
            }
            Some(Err(e)) => Some(Err(e)),
            None => None,
        }
    }
}

pub struct JoinedObjectCursor<'a, T>
where
    T: Convertible<Output = T> + NitriteEntity,
{
    cursor: JoinedDocumentCursor<'a>,
    _phantom: PhantomData<T>,
}

impl<'a, T> JoinedObjectCursor<'a, T>
where
    T: Convertible<Output = T> + NitriteEntity,
{
    pub fn new(cursor: JoinedDocumentCursor<'a>) -> Self {
        JoinedObjectCursor {
            cursor,
            _phantom: PhantomData,
        }
    }

    pub fn size(&mut self) -> usize {
        let mut count = 0;
        // Consume all joined documents.
        while self.next().is_some() {
            count += 1;
        }
        // Reset the underlying cursor for replayability.
        self.cursor.reset();
        count
    }
}

impl<'a, T> Iterator for JoinedObjectCursor<'a, T>
where
    T: Convertible<Output = T> + NitriteEntity,
{
    type Item = NitriteResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let doc_result = self.cursor.next();
        match doc_result {
            Some(Ok(doc)) => {
                let result = T::from_value(&Value::Document(doc));
                match result {
                    Ok(obj) => Some(Ok(obj)),
                    Err(e) => Some(Err(e)),
                }
            }
            Some(Err(e)) => Some(Err(e)),
            None => None,
        }
    }
}

pub struct ProjectedObjectCursor<'a, P>
where
    P: Convertible<Output = P> + NitriteEntity + Default,
{
    cursor: ProjectedDocumentCursor<'a>,
    _phantom: PhantomData<P>,
}

impl<'a, P> ProjectedObjectCursor<'a, P>
where
    P: Convertible<Output = P> + NitriteEntity + Default,
{
    pub fn new(cursor: &'a mut DocumentCursor) -> NitriteResult<Self> {
        let projection = P::default().to_value()?;
        let projection = projection.as_document().cloned().ok_or_else(|| {
            log::error!("Projection type is not convertible to document");
            NitriteError::new(
                "Projection type is not convertible to document",
                ErrorKind::ObjectMappingError,
            )
        })?;


        Ok(ProjectedObjectCursor {
            cursor: cursor.project(projection)?,
            _phantom: PhantomData,
        })
    }

    pub fn size(&mut self) -> usize {
        let count = self.cursor.size();
        // Reset the underlying cursor for replayability.
        self.cursor.reset();
        count
    }
}

impl<'a, P> Iterator for ProjectedObjectCursor<'a, P>
where
    P: Convertible<Output = P> + NitriteEntity + Default,
{
    type Item = NitriteResult<P>;

    fn next(&mut self) -> Option<Self::Item> {
        let doc_result = self.cursor.next();
        match doc_result {
            Some(Ok(doc)) => {
                let result = P::from_value(&Value::Document(doc));
                match result {
                    Ok(obj) => Some(Ok(obj)),
                    Err(e) => Some(Err(e)),
                }
            }
            Some(Err(e)) => Some(Err(e)),
            None => None,
        }
    }
}
