//! In-process document store.
//!
//! Keeps every collection in insertion order behind a single async lock.
//! Used when `database.backend = "memory"` and by the router tests.

use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::CatalogStore;
use crate::{
    error::AppResult,
    models::{
        Author, Book, BookDetail, BookInstance, BookInstanceDetail, BookInstanceStatus,
        BookSummary, BookTitle, Genre, NewAuthor, NewBook, NewBookInstance, NewGenre,
    },
};

#[derive(Default)]
struct Collections {
    authors: IndexMap<Uuid, Author>,
    genres: IndexMap<Uuid, Genre>,
    books: IndexMap<Uuid, Book>,
    book_instances: IndexMap<Uuid, BookInstance>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn replace<T>(map: &mut IndexMap<Uuid, T>, id: Uuid, value: T) -> Option<T>
where
    T: Clone,
{
    let slot = map.get_mut(&id)?;
    *slot = value;
    Some(slot.clone())
}

fn sorted_books(mut books: Vec<Book>) -> Vec<Book> {
    books.sort_by(|a, b| a.title.cmp(&b.title));
    books
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn list_authors(&self) -> AppResult<Vec<Author>> {
        let db = self.inner.read().await;
        let mut authors: Vec<Author> = db.authors.values().cloned().collect();
        authors.sort_by(|a, b| {
            (&a.family_name, &a.first_name).cmp(&(&b.family_name, &b.first_name))
        });
        Ok(authors)
    }

    async fn find_author(&self, id: Uuid) -> AppResult<Option<Author>> {
        Ok(self.inner.read().await.authors.get(&id).cloned())
    }

    async fn save_author(&self, author: &NewAuthor) -> AppResult<Author> {
        let author = author.clone().with_id(Uuid::new_v4());
        self.inner
            .write()
            .await
            .authors
            .insert(author.id, author.clone());
        Ok(author)
    }

    async fn update_author(&self, id: Uuid, author: &NewAuthor) -> AppResult<Option<Author>> {
        let mut db = self.inner.write().await;
        Ok(replace(&mut db.authors, id, author.clone().with_id(id)))
    }

    async fn delete_author(&self, id: Uuid) -> AppResult<()> {
        self.inner.write().await.authors.shift_remove(&id);
        Ok(())
    }

    async fn count_authors(&self) -> AppResult<i64> {
        Ok(self.inner.read().await.authors.len() as i64)
    }

    async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        let db = self.inner.read().await;
        let mut genres: Vec<Genre> = db.genres.values().cloned().collect();
        genres.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(genres)
    }

    async fn find_genre(&self, id: Uuid) -> AppResult<Option<Genre>> {
        Ok(self.inner.read().await.genres.get(&id).cloned())
    }

    async fn find_genre_by_name(&self, name: &str) -> AppResult<Option<Genre>> {
        let db = self.inner.read().await;
        Ok(db.genres.values().find(|g| g.name == name).cloned())
    }

    async fn save_genre(&self, genre: &NewGenre) -> AppResult<Genre> {
        let genre = Genre {
            id: Uuid::new_v4(),
            name: genre.name.clone(),
        };
        self.inner
            .write()
            .await
            .genres
            .insert(genre.id, genre.clone());
        Ok(genre)
    }

    async fn update_genre(&self, id: Uuid, genre: &NewGenre) -> AppResult<Option<Genre>> {
        let mut db = self.inner.write().await;
        let genre = Genre {
            id,
            name: genre.name.clone(),
        };
        Ok(replace(&mut db.genres, id, genre))
    }

    async fn delete_genre(&self, id: Uuid) -> AppResult<()> {
        self.inner.write().await.genres.shift_remove(&id);
        Ok(())
    }

    async fn count_genres(&self) -> AppResult<i64> {
        Ok(self.inner.read().await.genres.len() as i64)
    }

    async fn list_books(&self) -> AppResult<Vec<BookSummary>> {
        let db = self.inner.read().await;
        let books = sorted_books(db.books.values().cloned().collect());
        Ok(books
            .into_iter()
            .map(|book| BookSummary {
                id: book.id,
                author: db.authors.get(&book.author).cloned(),
                title: book.title,
            })
            .collect())
    }

    async fn list_book_titles(&self) -> AppResult<Vec<BookTitle>> {
        let db = self.inner.read().await;
        Ok(sorted_books(db.books.values().cloned().collect())
            .into_iter()
            .map(|book| BookTitle {
                id: book.id,
                title: book.title,
            })
            .collect())
    }

    async fn find_book(&self, id: Uuid) -> AppResult<Option<Book>> {
        Ok(self.inner.read().await.books.get(&id).cloned())
    }

    async fn find_book_detail(&self, id: Uuid) -> AppResult<Option<BookDetail>> {
        let db = self.inner.read().await;
        let Some(book) = db.books.get(&id) else {
            return Ok(None);
        };

        Ok(Some(BookDetail {
            id: book.id,
            title: book.title.clone(),
            author: db.authors.get(&book.author).cloned(),
            summary: book.summary.clone(),
            isbn: book.isbn.clone(),
            genre: book
                .genre
                .iter()
                .filter_map(|g| db.genres.get(g).cloned())
                .collect(),
        }))
    }

    async fn books_by_author(&self, author_id: Uuid) -> AppResult<Vec<Book>> {
        let db = self.inner.read().await;
        Ok(sorted_books(
            db.books
                .values()
                .filter(|b| b.author == author_id)
                .cloned()
                .collect(),
        ))
    }

    async fn books_by_genre(&self, genre_id: Uuid) -> AppResult<Vec<Book>> {
        let db = self.inner.read().await;
        Ok(sorted_books(
            db.books
                .values()
                .filter(|b| b.genre.contains(&genre_id))
                .cloned()
                .collect(),
        ))
    }

    async fn save_book(&self, book: &NewBook) -> AppResult<Book> {
        let book = book.clone().with_id(Uuid::new_v4());
        self.inner.write().await.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn update_book(&self, id: Uuid, book: &NewBook) -> AppResult<Option<Book>> {
        let mut db = self.inner.write().await;
        Ok(replace(&mut db.books, id, book.clone().with_id(id)))
    }

    async fn delete_book(&self, id: Uuid) -> AppResult<()> {
        self.inner.write().await.books.shift_remove(&id);
        Ok(())
    }

    async fn count_books(&self) -> AppResult<i64> {
        Ok(self.inner.read().await.books.len() as i64)
    }

    async fn list_book_instances(&self) -> AppResult<Vec<BookInstanceDetail>> {
        let db = self.inner.read().await;
        Ok(db
            .book_instances
            .values()
            .map(|instance| {
                BookInstanceDetail::populate(instance.clone(), db.books.get(&instance.book).cloned())
            })
            .collect())
    }

    async fn find_book_instance(&self, id: Uuid) -> AppResult<Option<BookInstance>> {
        Ok(self.inner.read().await.book_instances.get(&id).cloned())
    }

    async fn find_book_instance_detail(&self, id: Uuid) -> AppResult<Option<BookInstanceDetail>> {
        let db = self.inner.read().await;
        Ok(db.book_instances.get(&id).map(|instance| {
            BookInstanceDetail::populate(instance.clone(), db.books.get(&instance.book).cloned())
        }))
    }

    async fn instances_by_book(&self, book_id: Uuid) -> AppResult<Vec<BookInstance>> {
        let db = self.inner.read().await;
        Ok(db
            .book_instances
            .values()
            .filter(|i| i.book == book_id)
            .cloned()
            .collect())
    }

    async fn save_book_instance(&self, instance: &NewBookInstance) -> AppResult<BookInstance> {
        let instance = instance.clone().with_id(Uuid::new_v4());
        self.inner
            .write()
            .await
            .book_instances
            .insert(instance.id, instance.clone());
        Ok(instance)
    }

    async fn update_book_instance(
        &self,
        id: Uuid,
        instance: &NewBookInstance,
    ) -> AppResult<Option<BookInstance>> {
        let mut db = self.inner.write().await;
        Ok(replace(&mut db.book_instances, id, instance.clone().with_id(id)))
    }

    async fn delete_book_instance(&self, id: Uuid) -> AppResult<()> {
        self.inner.write().await.book_instances.shift_remove(&id);
        Ok(())
    }

    async fn count_book_instances(&self, status: Option<BookInstanceStatus>) -> AppResult<i64> {
        let db = self.inner.read().await;
        let count = db
            .book_instances
            .values()
            .filter(|i| status.map_or(true, |s| i.status == s))
            .count();
        Ok(count as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_book(title: &str, author: Uuid, genre: Vec<Uuid>) -> NewBook {
        NewBook {
            title: title.into(),
            author,
            summary: "summary".into(),
            isbn: "isbn".into(),
            genre,
        }
    }

    #[tokio::test]
    async fn test_find_by_unknown_id_is_none_not_error() {
        let store = MemoryStore::new();
        assert!(store.find_book(Uuid::new_v4()).await.unwrap().is_none());
        assert!(store.find_book_detail(Uuid::new_v4()).await.unwrap().is_none());
        assert!(store
            .update_genre(Uuid::new_v4(), &NewGenre { name: "x".into() })
            .await
            .unwrap()
            .is_none());
        store.delete_author(Uuid::new_v4()).await.unwrap();
    }

    #[tokio::test]
    async fn test_book_detail_populates_references() {
        let store = MemoryStore::new();
        let author = store
            .save_author(&NewAuthor {
                first_name: "Frank".into(),
                family_name: "Herbert".into(),
                date_of_birth: None,
                date_of_death: None,
            })
            .await
            .unwrap();
        let sf = store.save_genre(&NewGenre { name: "Science Fiction".into() }).await.unwrap();
        let missing_genre = Uuid::new_v4();

        let book = store
            .save_book(&new_book("Dune", author.id, vec![sf.id, missing_genre]))
            .await
            .unwrap();

        let detail = store.find_book_detail(book.id).await.unwrap().unwrap();
        assert_eq!(detail.author, Some(author));
        assert_eq!(detail.genre, vec![sf]);
    }

    #[tokio::test]
    async fn test_lists_are_sorted_and_dangling_author_is_none() {
        let store = MemoryStore::new();
        store.save_book(&new_book("Neuromancer", Uuid::new_v4(), vec![])).await.unwrap();
        store.save_book(&new_book("Dune", Uuid::new_v4(), vec![])).await.unwrap();

        let books = store.list_books().await.unwrap();
        let titles: Vec<_> = books.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Dune", "Neuromancer"]);
        assert!(books[0].author.is_none());
    }

    #[tokio::test]
    async fn test_update_replaces_whole_document() {
        let store = MemoryStore::new();
        let genre = Uuid::new_v4();
        let book = store
            .save_book(&new_book("Dune", Uuid::new_v4(), vec![genre]))
            .await
            .unwrap();

        let replacement = new_book("Dune Messiah", book.author, vec![]);
        let updated = store.update_book(book.id, &replacement).await.unwrap().unwrap();

        assert_eq!(updated.id, book.id);
        assert_eq!(updated.title, "Dune Messiah");
        assert!(store.books_by_genre(genre).await.unwrap().is_empty());
        assert_eq!(store.count_books().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_count_instances_by_status() {
        let store = MemoryStore::new();
        let book = Uuid::new_v4();
        for status in [
            BookInstanceStatus::Available,
            BookInstanceStatus::Available,
            BookInstanceStatus::Loaned,
        ] {
            store
                .save_book_instance(&NewBookInstance {
                    book,
                    imprint: "imprint".into(),
                    status,
                    due_back: None,
                })
                .await
                .unwrap();
        }

        assert_eq!(store.count_book_instances(None).await.unwrap(), 3);
        assert_eq!(
            store
                .count_book_instances(Some(BookInstanceStatus::Available))
                .await
                .unwrap(),
            2
        );
        assert_eq!(store.instances_by_book(book).await.unwrap().len(), 3);
    }
}
