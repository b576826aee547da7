//! Typed repositories for videos and montage sheets.

use std::collections::HashMap;

use chrono::Utc;
use metrics::counter;
use tracing::info;

use cutsheet_models::{
    MontageEntry, MontageSheet, SheetId, VideoId, VideoRecord, VideoStatus,
};

use crate::client::FirestoreClient;
use crate::error::{FirestoreError, FirestoreResult};
use crate::types::{Document, FromFirestoreValue, ToFirestoreValue, Value, Write};

/// Repository for video lifecycle records.
///
/// Records live in the top-level `videos` collection; a video's montage
/// sheets are a subcollection underneath it (see [`SheetRepository`]).
pub struct VideoRepository {
    client: FirestoreClient,
}

impl VideoRepository {
    /// Create a new video repository.
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    fn collection() -> &'static str {
        "videos"
    }

    /// Get a video by ID.
    pub async fn get(&self, video_id: &VideoId) -> FirestoreResult<Option<VideoRecord>> {
        let doc = self
            .client
            .get_document(Self::collection(), video_id.as_str())
            .await?;

        doc.map(|d| document_to_video(&d, video_id)).transpose()
    }

    /// Create a new video record.
    pub async fn create(&self, video: &VideoRecord) -> FirestoreResult<()> {
        self.client
            .create_document(Self::collection(), video.video_id.as_str(), video_to_fields(video))
            .await?;
        counter!("cutsheet_firestore_writes_total", "collection" => "videos").increment(1);
        info!(video_id = %video.video_id, "created video record");
        Ok(())
    }

    /// Move a video into `processing`. Idempotent; also clears the error
    /// message left by a previous failed run.
    pub async fn mark_processing(&self, video_id: &VideoId) -> FirestoreResult<()> {
        let mut fields = HashMap::new();
        fields.insert(
            "status".to_string(),
            VideoStatus::Processing.as_str().to_firestore_value(),
        );
        fields.insert("error_message".to_string(), Value::NullValue(()));
        fields.insert("updated_at".to_string(), Utc::now().to_firestore_value());

        self.update_masked(video_id, fields, &["status", "error_message", "updated_at"])
            .await
    }

    /// Mark a video `completed` and stamp the completion time.
    pub async fn complete(&self, video_id: &VideoId) -> FirestoreResult<()> {
        let now = Utc::now();
        let mut fields = HashMap::new();
        fields.insert(
            "status".to_string(),
            VideoStatus::Completed.as_str().to_firestore_value(),
        );
        fields.insert("completed_at".to_string(), now.to_firestore_value());
        fields.insert("updated_at".to_string(), now.to_firestore_value());

        self.update_masked(video_id, fields, &["status", "completed_at", "updated_at"])
            .await
    }

    /// Mark a video `error` with a human-readable message.
    pub async fn fail(&self, video_id: &VideoId, message: &str) -> FirestoreResult<()> {
        let mut fields = HashMap::new();
        fields.insert(
            "status".to_string(),
            VideoStatus::Error.as_str().to_firestore_value(),
        );
        fields.insert("error_message".to_string(), message.to_firestore_value());
        fields.insert("updated_at".to_string(), Utc::now().to_firestore_value());

        self.update_masked(video_id, fields, &["status", "error_message", "updated_at"])
            .await
    }

    /// Delete a video record.
    pub async fn delete(&self, video_id: &VideoId) -> FirestoreResult<()> {
        self.client
            .delete_document(Self::collection(), video_id.as_str())
            .await
    }

    async fn update_masked(
        &self,
        video_id: &VideoId,
        fields: HashMap<String, Value>,
        mask: &[&str],
    ) -> FirestoreResult<()> {
        self.client
            .update_document(
                Self::collection(),
                video_id.as_str(),
                fields,
                mask.iter().map(|s| s.to_string()).collect(),
            )
            .await?;
        counter!("cutsheet_firestore_writes_total", "collection" => "videos").increment(1);
        Ok(())
    }
}

/// Repository for one video's montage sheets and their entries.
pub struct SheetRepository {
    client: FirestoreClient,
    video_id: VideoId,
}

impl SheetRepository {
    /// Create a repository scoped to a video.
    pub fn new(client: FirestoreClient, video_id: VideoId) -> Self {
        Self { client, video_id }
    }

    fn sheets_collection(&self) -> String {
        format!("videos/{}/sheets", self.video_id)
    }

    fn entries_collection(&self, sheet_id: &SheetId) -> String {
        format!("videos/{}/sheets/{}/entries", self.video_id, sheet_id)
    }

    /// Create a sheet document.
    pub async fn create(&self, sheet: &MontageSheet) -> FirestoreResult<()> {
        self.client
            .create_document(
                &self.sheets_collection(),
                sheet.sheet_id.as_str(),
                sheet_to_fields(sheet),
            )
            .await?;
        counter!("cutsheet_firestore_writes_total", "collection" => "sheets").increment(1);
        info!(sheet_id = %sheet.sheet_id, video_id = %self.video_id, "created montage sheet");
        Ok(())
    }

    /// Insert all entries of a sheet in one atomic batch write.
    pub async fn insert_entries(
        &self,
        sheet_id: &SheetId,
        entries: &[MontageEntry],
    ) -> FirestoreResult<()> {
        let collection = self.entries_collection(sheet_id);
        let writes: Vec<Write> = entries
            .iter()
            .map(|entry| {
                Write::upsert(
                    self.client
                        .full_document_name(&collection, &entry.order_index.to_string()),
                    entry_to_fields(entry),
                )
            })
            .collect();

        self.client.batch_write(writes).await?;
        counter!("cutsheet_firestore_writes_total", "collection" => "entries")
            .increment(entries.len() as u64);
        info!(
            sheet_id = %sheet_id,
            entries = entries.len(),
            "inserted montage entries"
        );
        Ok(())
    }

    /// List all sheets of the video.
    pub async fn list(&self) -> FirestoreResult<Vec<MontageSheet>> {
        let mut sheets = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .client
                .list_documents(&self.sheets_collection(), Some(100), page_token.as_deref())
                .await?;

            for doc in page.documents.unwrap_or_default() {
                sheets.push(document_to_sheet(&doc, &self.video_id)?);
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(sheets)
    }

    /// List a sheet's entries ordered by `order_index`.
    pub async fn list_entries(&self, sheet_id: &SheetId) -> FirestoreResult<Vec<MontageEntry>> {
        let collection = self.entries_collection(sheet_id);
        let mut entries = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .client
                .list_documents(&collection, Some(300), page_token.as_deref())
                .await?;

            for doc in page.documents.unwrap_or_default() {
                entries.push(document_to_entry(&doc, sheet_id)?);
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        entries.sort_by_key(|e| e.order_index);
        Ok(entries)
    }

    /// Delete a sheet and all of its entries in one batch.
    ///
    /// Used both as the compensation path when entry insertion fails and
    /// by video deletion. Idempotent.
    pub async fn delete(&self, sheet_id: &SheetId) -> FirestoreResult<()> {
        let entries = self.list_entries(sheet_id).await.unwrap_or_default();
        let entries_collection = self.entries_collection(sheet_id);

        let mut writes: Vec<Write> = entries
            .iter()
            .map(|entry| {
                Write::delete(
                    self.client
                        .full_document_name(&entries_collection, &entry.order_index.to_string()),
                )
            })
            .collect();
        writes.push(Write::delete(
            self.client
                .full_document_name(&self.sheets_collection(), sheet_id.as_str()),
        ));

        self.client.batch_write(writes).await?;
        info!(sheet_id = %sheet_id, video_id = %self.video_id, "deleted montage sheet");
        Ok(())
    }
}

// ============================================================================
// Field mapping
// ============================================================================

fn require<T: FromFirestoreValue>(doc: &Document, field: &str) -> FirestoreResult<T> {
    doc.field(field)
        .and_then(T::from_firestore_value)
        .ok_or_else(|| {
            FirestoreError::invalid_document(format!("missing or mistyped field '{}'", field))
        })
}

fn optional<T: FromFirestoreValue>(doc: &Document, field: &str) -> Option<T> {
    doc.field(field).and_then(T::from_firestore_value)
}

pub(crate) fn video_to_fields(video: &VideoRecord) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("user_id".to_string(), video.user_id.to_firestore_value());
    fields.insert("video_url".to_string(), video.video_url.to_firestore_value());
    fields.insert("title".to_string(), video.title.to_firestore_value());
    fields.insert(
        "status".to_string(),
        video.status.as_str().to_firestore_value(),
    );
    fields.insert("created_at".to_string(), video.created_at.to_firestore_value());
    fields.insert("updated_at".to_string(), video.updated_at.to_firestore_value());
    fields.insert(
        "completed_at".to_string(),
        video.completed_at.to_firestore_value(),
    );
    fields.insert(
        "error_message".to_string(),
        video.error_message.to_firestore_value(),
    );
    fields
}

pub(crate) fn document_to_video(
    doc: &Document,
    video_id: &VideoId,
) -> FirestoreResult<VideoRecord> {
    let status: String = require(doc, "status")?;
    let status = VideoStatus::parse(&status)
        .ok_or_else(|| FirestoreError::invalid_document(format!("unknown status '{}'", status)))?;

    Ok(VideoRecord {
        video_id: video_id.clone(),
        user_id: require(doc, "user_id")?,
        video_url: require(doc, "video_url")?,
        title: require(doc, "title")?,
        status,
        created_at: require(doc, "created_at")?,
        updated_at: require(doc, "updated_at")?,
        completed_at: optional(doc, "completed_at"),
        error_message: optional(doc, "error_message"),
    })
}

pub(crate) fn sheet_to_fields(sheet: &MontageSheet) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert(
        "video_id".to_string(),
        sheet.video_id.as_str().to_firestore_value(),
    );
    fields.insert("user_id".to_string(), sheet.user_id.to_firestore_value());
    fields.insert("title".to_string(), sheet.title.to_firestore_value());
    fields.insert("created_at".to_string(), sheet.created_at.to_firestore_value());
    fields
}

pub(crate) fn document_to_sheet(
    doc: &Document,
    video_id: &VideoId,
) -> FirestoreResult<MontageSheet> {
    let sheet_id = doc
        .doc_id()
        .ok_or_else(|| FirestoreError::invalid_document("sheet document has no name"))?;

    Ok(MontageSheet {
        sheet_id: SheetId::from_string(sheet_id),
        video_id: video_id.clone(),
        user_id: require(doc, "user_id")?,
        title: require(doc, "title")?,
        created_at: require(doc, "created_at")?,
    })
}

pub(crate) fn entry_to_fields(entry: &MontageEntry) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("plan_number".to_string(), entry.plan_number.to_firestore_value());
    fields.insert(
        "start_timecode".to_string(),
        entry.start_timecode.to_firestore_value(),
    );
    fields.insert(
        "end_timecode".to_string(),
        entry.end_timecode.to_firestore_value(),
    );
    fields.insert("plan_type".to_string(), entry.plan_type.to_firestore_value());
    fields.insert(
        "description".to_string(),
        entry.description.to_firestore_value(),
    );
    fields.insert("dialogues".to_string(), entry.dialogues.to_firestore_value());
    fields.insert("order_index".to_string(), entry.order_index.to_firestore_value());
    fields
}

pub(crate) fn document_to_entry(
    doc: &Document,
    sheet_id: &SheetId,
) -> FirestoreResult<MontageEntry> {
    Ok(MontageEntry {
        sheet_id: sheet_id.clone(),
        plan_number: require(doc, "plan_number")?,
        start_timecode: require(doc, "start_timecode")?,
        end_timecode: require(doc, "end_timecode")?,
        plan_type: require(doc, "plan_type")?,
        description: require(doc, "description")?,
        dialogues: require(doc, "dialogues")?,
        order_index: require(doc, "order_index")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cutsheet_models::{Scene, Timecode};

    fn doc_named(name: &str, fields: HashMap<String, Value>) -> Document {
        Document {
            name: Some(name.to_string()),
            fields: Some(fields),
            create_time: None,
            update_time: None,
        }
    }

    #[test]
    fn test_video_mapping_round_trip() {
        let video_id = VideoId::from_string("vid-1");
        let record = VideoRecord::new(
            video_id.clone(),
            "user-1",
            "https://cdn.example/v.mp4",
            "Walkthrough",
        )
        .begin_processing();

        let doc = doc_named("projects/p/databases/d/documents/videos/vid-1", video_to_fields(&record));
        let back = document_to_video(&doc, &video_id).unwrap();

        assert_eq!(back.user_id, record.user_id);
        assert_eq!(back.video_url, record.video_url);
        assert_eq!(back.status, VideoStatus::Processing);
        assert!(back.completed_at.is_none());
        assert!(back.error_message.is_none());
    }

    #[test]
    fn test_failed_video_keeps_error_message() {
        let video_id = VideoId::from_string("vid-2");
        let record = VideoRecord::new(video_id.clone(), "user-1", "https://v", "Clip")
            .fail("no scenes could be extracted");

        let doc = doc_named("…/videos/vid-2", video_to_fields(&record));
        let back = document_to_video(&doc, &video_id).unwrap();

        assert_eq!(back.status, VideoStatus::Error);
        assert_eq!(
            back.error_message.as_deref(),
            Some("no scenes could be extracted")
        );
    }

    #[test]
    fn test_entry_mapping_round_trip() {
        let sheet_id = SheetId::from_string("sheet-1");
        let mut scene = Scene::open(
            "15:20 - 15:29",
            Timecode::normalize("15:20"),
            Timecode::normalize("15:29"),
        );
        scene.plan_type = "Medium".to_string();
        scene.description = "Man enters room.".to_string();
        scene.push_dialogue("Dialogue: \"Hello.\"");

        let entry = MontageEntry::from_scene(sheet_id.clone(), 3, &scene);
        let doc = doc_named("…/entries/3", entry_to_fields(&entry));
        let back = document_to_entry(&doc, &sheet_id).unwrap();

        assert_eq!(back, entry);
        assert_eq!(back.plan_number, 4);
    }

    #[test]
    fn test_sheet_mapping_reads_id_from_document_name() {
        let video_id = VideoId::from_string("vid-1");
        let sheet = MontageSheet::new(video_id.clone(), "user-1", "Montage sheet");

        let doc = doc_named(
            &format!("projects/p/databases/d/documents/videos/vid-1/sheets/{}", sheet.sheet_id),
            sheet_to_fields(&sheet),
        );
        let back = document_to_sheet(&doc, &video_id).unwrap();

        assert_eq!(back.sheet_id, sheet.sheet_id);
        assert_eq!(back.title, "Montage sheet");
    }

    #[test]
    fn test_missing_field_is_invalid_document() {
        let video_id = VideoId::from_string("vid-3");
        let doc = doc_named("…/videos/vid-3", HashMap::new());
        assert!(matches!(
            document_to_video(&doc, &video_id),
            Err(FirestoreError::InvalidDocument(_))
        ));
    }
}
