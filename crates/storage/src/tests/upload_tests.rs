use tempfile::TempDir;

use crate::UploadStore;

#[tokio::test]
async fn staged_upload_is_removed_unless_committed() {
    let dir = TempDir::new().unwrap();
    let uploads = UploadStore::new(dir.path().join("uploaded_pdfs"));

    let staged = uploads.stage("s1", b"%PDF-1.4 dropped").await.unwrap();
    let temp_path = staged.path().to_path_buf();
    assert!(temp_path.exists());
    drop(staged);

    assert!(!temp_path.exists());
    assert!(!uploads.path_for("s1").unwrap().exists());
}

#[tokio::test]
async fn commit_moves_to_session_keyed_path() {
    let dir = TempDir::new().unwrap();
    let uploads = UploadStore::new(dir.path());

    let staged = uploads.stage("s1", b"%PDF-1.4 first").await.unwrap();
    let final_path = staged.commit().await.unwrap().keep().await;
    assert_eq!(final_path, dir.path().join("s1.pdf"));

    // a second upload for the same session replaces the file
    let staged = uploads.stage("s1", b"%PDF-1.4 second").await.unwrap();
    staged.commit().await.unwrap().keep().await;
    assert_eq!(std::fs::read(&final_path).unwrap(), b"%PDF-1.4 second");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn unkept_commit_restores_previous_upload() {
    let dir = TempDir::new().unwrap();
    let uploads = UploadStore::new(dir.path());
    uploads.stage("s1", b"%PDF-1.4 original").await.unwrap().commit().await.unwrap().keep().await;

    let pending = uploads.stage("s1", b"%PDF-1.4 rejected").await.unwrap().commit().await.unwrap();
    assert_eq!(std::fs::read(pending.path()).unwrap(), b"%PDF-1.4 rejected");
    drop(pending);

    assert_eq!(std::fs::read(dir.path().join("s1.pdf")).unwrap(), b"%PDF-1.4 original");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn unkept_first_commit_leaves_nothing() {
    let dir = TempDir::new().unwrap();
    let uploads = UploadStore::new(dir.path());

    drop(uploads.stage("s1", b"%PDF-1.4 rejected").await.unwrap().commit().await.unwrap());

    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn path_for_rejects_unsafe_ids() {
    let uploads = UploadStore::new("/tmp/uploads");
    assert!(uploads.path_for("../secret").is_err());
    assert!(uploads.path_for(".hidden").is_err());
    assert!(uploads.path_for("").is_err());
    assert!(uploads.path_for("ok_id-1.2").is_ok());
}

#[tokio::test]
async fn remove_reports_whether_file_existed() {
    let dir = TempDir::new().unwrap();
    let uploads = UploadStore::new(dir.path());
    uploads.stage("s1", b"%PDF-").await.unwrap().commit().await.unwrap().keep().await;

    assert!(uploads.remove("s1").await.unwrap());
    assert!(!uploads.remove("s1").await.unwrap());
}

#[tokio::test]
async fn sweep_removes_only_stale_files() {
    let dir = TempDir::new().unwrap();
    let uploads = UploadStore::new(dir.path());
    uploads.stage("kept", b"%PDF-").await.unwrap().commit().await.unwrap().keep().await;
    std::fs::write(dir.path().join(".s2.1234.partial"), b"junk").unwrap();
    std::fs::write(dir.path().join(".s3.5678.partial"), b"junk").unwrap();
    std::fs::write(dir.path().join(".s4.9abc.backup"), b"junk").unwrap();

    assert_eq!(uploads.sweep_partials().await.unwrap(), 3);
    assert!(dir.path().join("kept.pdf").exists());

    let missing = UploadStore::new(dir.path().join("never-created"));
    assert_eq!(missing.sweep_partials().await.unwrap(), 0);
}
