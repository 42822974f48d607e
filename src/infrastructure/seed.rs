use sea_orm::*;

use crate::models::book;

const DEMO_BOOKS: &[(&str, &str, &str, i32)] = &[
    ("A Brief History of Time", "Stephen Hawking", "9780553380163", 4),
    ("Things Fall Apart", "Chinua Achebe", "9780385474542", 6),
    ("To Kill a Mockingbird", "Harper Lee", "9780061120084", 10),
    ("The Selfish Gene", "Richard Dawkins", "9780198788607", 3),
    ("Introduction to Algorithms", "Thomas H. Cormen", "9780262046305", 2),
];

/// Seed a small demo inventory. Does nothing when books already exist.
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    if book::Entity::find().count(db).await? > 0 {
        tracing::info!("Inventory not empty, skipping demo seed");
        return Ok(());
    }

    let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

    for (title, author, isbn, copies) in DEMO_BOOKS {
        let demo = book::ActiveModel {
            title: Set((*title).to_owned()),
            author: Set((*author).to_owned()),
            isbn: Set(Some((*isbn).to_owned())),
            total_copies: Set(*copies),
            available_copies: Set(*copies),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        };
        book::Entity::insert(demo).exec(db).await?;
    }

    tracing::info!("Seeded {} demo books", DEMO_BOOKS.len());
    Ok(())
}
