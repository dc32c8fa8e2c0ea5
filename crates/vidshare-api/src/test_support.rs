use uuid::Uuid;

use vidshare_db::Database;
use vidshare_types::api::{NewVideo, RegisterRequest};

use crate::auth::register_user;
use crate::videos::publish_video;

pub fn user(db: &Database, name: &str) -> Uuid {
    register_user(
        db,
        &RegisterRequest {
            username: name.into(),
            full_name: format!("{name} full"),
            password: "password123".into(),
            avatar: Some(format!("/assets/{name}.png")),
        },
    )
    .unwrap()
}

pub fn new_video(title: &str) -> NewVideo {
    NewVideo {
        title: title.into(),
        description: "desc".into(),
        duration: 12.5,
        video_file: "/assets/v.mp4".into(),
        thumbnail: "/assets/t.png".into(),
    }
}

/// Published video owned by `owner`.
pub fn video(db: &Database, owner: Uuid, title: &str) -> Uuid {
    publish_video(db, owner, new_video(title)).unwrap().id
}
