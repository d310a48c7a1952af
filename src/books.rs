use crate::{error::AppError, model::Book};

const BOOK_NOT_FOUND: &str = "Book not found";

/// In-memory book collection; insertion order is the listing order.
#[derive(Debug, Default, Clone)]
pub struct BookStore {
    books: Vec<Book>,
}

impl BookStore {
    pub fn seeded() -> Self {
        let books = [
            ("1984", "George Orwell"),
            ("The Alchemist", "Paulo Coelho"),
            ("The Hobbit", "J.R.R. Tolkien"),
            ("To Kill a Mockingbird", "Harper Lee"),
            ("Pride and Prejudice", "Jane Austen"),
            ("The Great Gatsby", "F. Scott Fitzgerald"),
            ("Moby Dick", "Herman Melville"),
            ("Harry Potter and the Sorcerer's Stone", "J.K. Rowling"),
            ("The Catcher in the Rye", "J.D. Salinger"),
            ("The Lord of the Rings", "J.R.R. Tolkien"),
        ]
        .into_iter()
        .zip(1..)
        .map(|((title, author), id)| Book::new(id, title, author))
        .collect();

        Self { books }
    }

    pub fn list(&self) -> Vec<Book> {
        self.books.clone()
    }

    pub fn create(
        &mut self,
        title: Option<String>,
        author: Option<String>,
    ) -> Result<Book, AppError> {
        let (Some(title), Some(author)) = (present(title), present(author)) else {
            return Err(AppError::Validation("Title and Author required".to_string()));
        };

        let id = self.books.iter().map(|b| b.id).max().unwrap_or(0) + 1;
        let book = Book::new(id, title, author);
        self.books.push(book.clone());

        Ok(book)
    }

    pub fn update(
        &mut self,
        id: i64,
        title: Option<String>,
        author: Option<String>,
    ) -> Result<Book, AppError> {
        let book = self
            .books
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| AppError::NotFound(BOOK_NOT_FOUND.to_string()))?;

        if let Some(title) = present(title) {
            book.title = title;
        }
        if let Some(author) = present(author) {
            book.author = author;
        }

        Ok(book.clone())
    }

    pub fn delete(&mut self, id: i64) -> Result<Book, AppError> {
        let index = self
            .books
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| AppError::NotFound(BOOK_NOT_FOUND.to_string()))?;

        Ok(self.books.remove(index))
    }
}

/// Empty strings count as missing.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_title_and_author() {
        let mut store = BookStore::default();
        let err = store.create(Some("Dune".into()), None).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = store.create(Some("".into()), Some("Frank Herbert".into())).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(store.list().is_empty());
    }

    #[test]
    fn create_assigns_next_id() {
        let mut store = BookStore::default();
        let first = store.create(Some("Dune".into()), Some("Frank Herbert".into())).unwrap();
        assert_eq!(first.id, 1);

        let mut seeded = BookStore::seeded();
        seeded.delete(4).unwrap();
        let book = seeded.create(Some("Emma".into()), Some("Jane Austen".into())).unwrap();
        assert_eq!(book.id, 11);
        assert_eq!(seeded.list().last(), Some(&book));
    }

    #[test]
    fn deleted_max_id_is_reused() {
        let mut store = BookStore::seeded();
        store.delete(10).unwrap();
        let book = store.create(Some("Emma".into()), Some("Jane Austen".into())).unwrap();
        assert_eq!(book.id, 10);

        let mut store = BookStore::seeded();
        store.delete(1).unwrap();
        let book = store.create(Some("Emma".into()), Some("Jane Austen".into())).unwrap();
        assert_eq!(book.id, 11);
    }

    #[test]
    fn partial_update_keeps_other_fields() {
        let mut store = BookStore::seeded();
        let book = store.update(1, Some("Nineteen Eighty-Four".into()), None).unwrap();
        assert_eq!(book.title, "Nineteen Eighty-Four");
        assert_eq!(book.author, "George Orwell");
        assert_eq!(store.list()[0], book);
    }

    #[test]
    fn update_and_delete_missing_id() {
        let mut store = BookStore::seeded();
        assert!(matches!(store.update(99, None, None), Err(AppError::NotFound(_))));
        assert!(matches!(store.delete(99), Err(AppError::NotFound(_))));
        assert_eq!(store.list().len(), 10);
    }

    #[test]
    fn delete_removes_exactly_one() {
        let mut store = BookStore::seeded();
        let removed = store.delete(3).unwrap();
        assert_eq!(removed.title, "The Hobbit");
        assert_eq!(store.list().len(), 9);
        assert!(store.list().iter().all(|b| b.id != 3));
    }

    #[test]
    fn list_is_stable_without_mutation() {
        let store = BookStore::seeded();
        assert_eq!(store.list(), store.list());
    }
}
