//! In-memory fitness domain fixtures
//!
//! The real domain controllers live behind a hosted datastore; this
//! store stands in for them so the BFF layer has concrete handlers to
//! wrap. Fixture payloads deliberately carry image URLs, date strings,
//! nullable fields, and internal debug fields so every transformation
//! rule is exercised end to end.

use chrono::Utc;
use serde_json::{json, Value};
use stride_bff::{BffError, Result};
use uuid::Uuid;

/// Fixture-backed stand-in for the exercise, competition, and social
/// services
#[derive(Debug, Default, Clone)]
pub struct FixtureStore;

impl FixtureStore {
    pub fn new() -> Self {
        Self
    }

    /// Aggregated exercise statistics for a user
    pub fn exercise_stats(&self, user_id: Option<&str>) -> Value {
        json!({
            "userId": user_id.unwrap_or("anonymous"),
            "totalSessions": 42,
            "totalDurationMinutes": 1260,
            "caloriesBurned": 18450,
            "currentStreakDays": 6,
            "lastSessionAt": "2024-03-01T12:00:00Z",
            "weeklyGoal": {
                "targetSessions": 5,
                "completedSessions": 3,
                "notes": null
            },
            "internalId": "stats-agg-7731",
            "rawData": {"bucketed": [12, 9, 21]}
        })
    }

    /// Available exercise templates, optionally filtered by category
    pub fn exercise_templates(&self, category: Option<&str>) -> Value {
        let templates = [
            json!({
                "id": "tmpl-squat",
                "name": "Back Squat",
                "category": "strength",
                "difficulty": "intermediate",
                "imageUrl": "https://cdn.stride.example/exercises/squat.jpg",
                "defaultDurationMinutes": 20,
                "description": null,
                "createdAt": "2023-11-02T09:30:00Z",
                "internalId": "row-101"
            }),
            json!({
                "id": "tmpl-run",
                "name": "Interval Run",
                "category": "cardio",
                "difficulty": "beginner",
                "imageUrl": "https://cdn.stride.example/exercises/run.jpg?width=1200",
                "defaultDurationMinutes": 30,
                "description": "Alternating sprint and recovery blocks",
                "createdAt": "2023-11-02T09:30:00Z",
                "internalId": "row-102"
            }),
            json!({
                "id": "tmpl-yoga",
                "name": "Morning Flow",
                "category": "mobility",
                "difficulty": "beginner",
                "imageUrl": "https://cdn.stride.example/exercises/yoga.jpg",
                "defaultDurationMinutes": 15,
                "description": null,
                "createdAt": "2024-01-15T08:00:00Z",
                "internalId": "row-103"
            }),
        ];

        let filtered: Vec<Value> = templates
            .into_iter()
            .filter(|t| category.map_or(true, |c| t["category"] == json!(c)))
            .collect();

        Value::Array(filtered)
    }

    /// Record a new exercise session for a user
    ///
    /// The session is echoed back rather than persisted; validation
    /// failures surface as 400s through the pipeline.
    pub fn create_session(&self, user_id: &str, body: &Value) -> Result<Value> {
        let template_id = body
            .get("templateId")
            .and_then(Value::as_str)
            .ok_or_else(|| BffError::Validation("templateId is required".to_string()))?;
        let duration = body
            .get("durationMinutes")
            .and_then(Value::as_u64)
            .ok_or_else(|| BffError::Validation("durationMinutes is required".to_string()))?;

        Ok(json!({
            "id": format!("session-{}", Uuid::new_v4()),
            "userId": user_id,
            "templateId": template_id,
            "durationMinutes": duration,
            "createdAt": Utc::now().to_rfc3339(),
        }))
    }

    /// Current competition leaderboard
    pub fn competition_leaderboard(&self) -> Value {
        json!([
            {
                "rank": 1,
                "userName": "ana",
                "avatarUrl": "https://cdn.stride.example/avatars/ana.png",
                "score": 2840,
                "updatedAt": "2024-03-01 07:45:00",
                "internalId": "lb-1"
            },
            {
                "rank": 2,
                "userName": "ben",
                "avatarUrl": "https://cdn.stride.example/avatars/ben.png",
                "score": 2610,
                "updatedAt": "2024-03-01 07:45:00",
                "internalId": "lb-2"
            },
            {
                "rank": 3,
                "userName": "chloe",
                "avatarUrl": "https://cdn.stride.example/avatars/chloe.png",
                "score": 2390,
                "updatedAt": "2024-03-01 07:45:00",
                "internalId": "lb-3"
            }
        ])
    }

    /// Recent activity feed from friends
    pub fn social_feed(&self) -> Value {
        json!([
            {
                "id": "act-1",
                "userName": "ana",
                "activityType": "workout_completed",
                "message": "Finished Interval Run",
                "imageUrl": "https://cdn.stride.example/feed/run-selfie.jpg",
                "likes": 14,
                "comment": null,
                "animations": true,
                "pollingInterval": 1000,
                "createdAt": "2024-03-01T10:12:00Z"
            },
            {
                "id": "act-2",
                "userName": "ben",
                "activityType": "achievement_unlocked",
                "message": "7-day streak!",
                "imageUrl": "https://cdn.stride.example/feed/streak.jpg",
                "likes": 32,
                "comment": "keep it up",
                "animations": true,
                "pollingInterval": 1000,
                "createdAt": "2024-03-01T09:40:00Z"
            }
        ])
    }
}
