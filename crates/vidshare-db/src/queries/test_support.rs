use uuid::Uuid;

use vidshare_types::api::NewVideo;

use crate::Database;

pub fn seed_user(db: &Database, username: &str) -> Uuid {
    let id = Uuid::new_v4();
    db.create_user(id, username, &format!("{username} full"), "", "hash")
        .unwrap();
    id
}

pub fn seed_video(db: &Database, owner: Uuid, title: &str, published: bool) -> Uuid {
    db.with_tx(|tx| {
        let video = super::videos::insert_video(
            tx,
            owner,
            &NewVideo {
                title: title.to_string(),
                description: format!("about {title}"),
                duration: 42.0,
                video_file: format!("/assets/{title}.mp4"),
                thumbnail: format!("/assets/{title}.png"),
            },
        )?;
        if !published {
            tx.execute(
                "UPDATE videos SET is_published = 0 WHERE id = ?1",
                [video.id.to_string()],
            )?;
        }
        Ok::<_, anyhow::Error>(video.id)
    })
    .unwrap()
}

pub fn seed_tweet(db: &Database, owner: Uuid, content: &str) -> Uuid {
    db.with_tx(|tx| super::tweets::insert_tweet(tx, owner, content))
        .unwrap()
        .id
}
