//! Scripted backend and synthetic faces
//!
//! Replays canned detector output. Used by tests across the workspace and by
//! the simulation binary in place of a real inference engine.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::detection::{
    DetectOptions, DetectionResult, FaceDetection, FaceLandmarks, ObjectDetection, Point,
};
use crate::{DetectorBackend, DetectorError, Frame};

/// One canned reply
#[derive(Debug, Clone)]
pub enum ScriptedResponse<T> {
    Reply(T),
    Fail(DetectorError),
}

/// Backend replaying queued responses.
///
/// Each call consumes the front of its queue; the last entry is sticky and
/// repeats once the queue is down to one. An empty queue answers with no
/// detections.
pub struct ScriptedBackend {
    name: String,
    faces: Mutex<VecDeque<ScriptedResponse<Vec<FaceDetection>>>>,
    objects: Mutex<VecDeque<ScriptedResponse<Vec<ObjectDetection>>>>,
    face_calls: AtomicUsize,
    object_calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            faces: Mutex::new(VecDeque::new()),
            objects: Mutex::new(VecDeque::new()),
            face_calls: AtomicUsize::new(0),
            object_calls: AtomicUsize::new(0),
        }
    }

    /// Backend whose every call fails
    pub fn failing(name: impl Into<String>, reason: &str) -> Self {
        let err = DetectorError::Unavailable(reason.to_string());
        Self::new(name)
            .then_faces(ScriptedResponse::Fail(err.clone()))
            .then_objects(ScriptedResponse::Fail(err))
    }

    /// Queue a face reply
    pub fn then_faces(self, response: ScriptedResponse<Vec<FaceDetection>>) -> Self {
        lock(&self.faces).push_back(response);
        self
    }

    /// Queue an object reply
    pub fn then_objects(self, response: ScriptedResponse<Vec<ObjectDetection>>) -> Self {
        lock(&self.objects).push_back(response);
        self
    }

    /// Queue a successful face reply
    pub fn with_faces(self, faces: Vec<FaceDetection>) -> Self {
        self.then_faces(ScriptedResponse::Reply(faces))
    }

    /// Queue a successful object reply
    pub fn with_objects(self, objects: Vec<ObjectDetection>) -> Self {
        self.then_objects(ScriptedResponse::Reply(objects))
    }

    /// Number of `detect_faces` calls served
    pub fn face_calls(&self) -> usize {
        self.face_calls.load(Ordering::Relaxed)
    }

    /// Number of `detect_objects` calls served
    pub fn object_calls(&self) -> usize {
        self.object_calls.load(Ordering::Relaxed)
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn next<T: Clone>(queue: &Mutex<VecDeque<ScriptedResponse<T>>>) -> Option<ScriptedResponse<T>> {
    let mut queue = lock(queue);
    if queue.len() > 1 {
        queue.pop_front()
    } else {
        queue.front().cloned()
    }
}

#[async_trait]
impl DetectorBackend for ScriptedBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn detect_faces(
        &self,
        _frame: &Frame,
        options: DetectOptions,
    ) -> Result<DetectionResult, DetectorError> {
        self.face_calls.fetch_add(1, Ordering::Relaxed);
        match next(&self.faces) {
            None => Ok(DetectionResult::empty()),
            Some(ScriptedResponse::Fail(e)) => Err(e),
            Some(ScriptedResponse::Reply(faces)) => Ok(DetectionResult::from_faces(
                faces
                    .into_iter()
                    .filter(|f| f.score >= options.min_confidence)
                    .collect(),
            )),
        }
    }

    async fn detect_objects(
        &self,
        _frame: &Frame,
        options: DetectOptions,
    ) -> Result<Vec<ObjectDetection>, DetectorError> {
        self.object_calls.fetch_add(1, Ordering::Relaxed);
        match next(&self.objects) {
            None => Ok(Vec::new()),
            Some(ScriptedResponse::Fail(e)) => Err(e),
            Some(ScriptedResponse::Reply(objects)) => Ok(objects
                .into_iter()
                .filter(|o| o.score >= options.min_confidence)
                .collect()),
        }
    }
}

/// Builder for geometrically consistent synthetic faces.
///
/// `yaw` and `pitch` are placed so the landmark geometry reproduces them;
/// `roll_degrees` rotates the eyes and jaw about the eye midpoint.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticFace {
    pub center: Point,
    pub eye_separation: f32,
    pub face_height: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub roll_degrees: f32,
    pub score: f32,
}

impl Default for SyntheticFace {
    fn default() -> Self {
        Self {
            center: Point::new(320.0, 200.0),
            eye_separation: 60.0,
            face_height: 100.0,
            yaw: 0.0,
            pitch: 0.0,
            roll_degrees: 0.0,
            score: 0.95,
        }
    }
}

impl SyntheticFace {
    /// Face looking straight at the camera
    pub fn frontal() -> Self {
        Self::default()
    }

    pub fn yaw(mut self, yaw: f32) -> Self {
        self.yaw = yaw;
        self
    }

    pub fn pitch(mut self, pitch: f32) -> Self {
        self.pitch = pitch;
        self
    }

    pub fn roll(mut self, degrees: f32) -> Self {
        self.roll_degrees = degrees;
        self
    }

    pub fn score(mut self, score: f32) -> Self {
        self.score = score;
        self
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.center = Point::new(x, y);
        self
    }

    pub fn landmarks(&self) -> FaceLandmarks {
        let c = self.center;
        let half = self.eye_separation / 2.0;
        let (sin, cos) = self.roll_degrees.to_radians().sin_cos();
        let rotate = |p: Point| {
            let (dx, dy) = (p.x - c.x, p.y - c.y);
            Point::new(c.x + dx * cos - dy * sin, c.y + dx * sin + dy * cos)
        };

        let w = self.eye_separation * 0.2;
        let lid = self.eye_separation * 0.07;
        // Outer corner is away from the nose on both eyes.
        let eye = |ec: Point, outward: f32| {
            vec![
                Point::new(ec.x - outward * w, ec.y),
                Point::new(ec.x - outward * w / 3.0, ec.y - lid),
                Point::new(ec.x + outward * w / 3.0, ec.y - lid),
                Point::new(ec.x + outward * w, ec.y),
                Point::new(ec.x + outward * w / 3.0, ec.y + lid),
                Point::new(ec.x - outward * w / 3.0, ec.y + lid),
            ]
        };
        let left_eye = eye(Point::new(c.x - half, c.y), 1.0);
        let right_eye = eye(Point::new(c.x + half, c.y), -1.0);

        let jaw_half_width = self.eye_separation * 1.2;
        let jaw = (0..FaceLandmarks::JAW_POINTS)
            .map(|i| {
                let t = i as f32 / (FaceLandmarks::JAW_POINTS - 1) as f32 * std::f32::consts::PI;
                Point::new(c.x - jaw_half_width * t.cos(), c.y + self.face_height * t.sin())
            })
            .collect::<Vec<_>>();

        let nose_tip = Point::new(
            c.x + self.yaw * self.eye_separation,
            c.y + (0.3 + self.pitch) * self.face_height,
        );

        FaceLandmarks {
            left_eye: left_eye.into_iter().map(rotate).collect(),
            right_eye: right_eye.into_iter().map(rotate).collect(),
            nose_tip,
            jaw: jaw.into_iter().map(rotate).collect(),
        }
    }

    pub fn detection(&self) -> FaceDetection {
        let c = self.center;
        FaceDetection {
            x: c.x - self.eye_separation * 1.2,
            y: c.y - self.face_height * 0.6,
            width: self.eye_separation * 2.4,
            height: self.face_height * 1.6,
            score: self.score,
            landmarks: Some(self.landmarks()),
        }
    }
}
