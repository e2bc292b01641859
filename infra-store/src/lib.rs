mod blob;
mod question;
mod recording;
mod user;

pub use blob::DirectoryBlobStore;
pub use question::InMemoryQuestionStore;
pub use recording::InMemoryRecordingStore;
pub use user::InMemoryUserStore;
