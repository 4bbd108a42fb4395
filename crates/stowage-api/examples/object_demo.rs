use serde::{Deserialize, Serialize};
use stowage::{FileSystemEngine, Identifier, ObjectStorage};

#[derive(Debug, Serialize, Deserialize)]
struct Note {
    title: String,
    body: String,
    pinned: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Stowage Object Demo ===\n");

    let dir = tempfile::tempdir()?;
    let notes: ObjectStorage<Note, _> =
        ObjectStorage::new(FileSystemEngine::<Identifier>::open(dir.path()));

    notes
        .store(
            &Note {
                title: "Groceries".into(),
                body: "milk, eggs".into(),
                pinned: true,
            },
            &Identifier::new("groceries")?,
        )
        .await?;
    notes
        .store(
            &Note {
                title: "Ideas".into(),
                body: "write a storage engine".into(),
                pinned: false,
            },
            &Identifier::new("ideas")?,
        )
        .await?;

    for (id, note) in notes.all_keys_and_objects().await? {
        println!("{}: {:?}", id, note);
    }

    if let Some(created) = notes.created_at(&Identifier::new("ideas")?).await? {
        println!("\n'ideas' created at {:?}", created);
    }

    println!("\n=== Demo Complete ===");
    Ok(())
}
