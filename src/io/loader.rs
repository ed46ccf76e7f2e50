// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! One-shot background file loads.
//!
//! Decoding runs on a worker thread; the UI polls the result once per frame
//! and hands it to the editor on its own thread.

use super::{media, serialization};
use crate::io::media::ImageHandle;
use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, TryRecvError};

/// Payload of a finished load.
#[derive(Debug)]
pub enum Loaded {
    Image { path: PathBuf, image: ImageHandle },
    Annotations { path: PathBuf, text: String },
}

/// A load in flight.
pub struct PendingLoad {
    receiver: Receiver<Result<Loaded>>,
    message: String,
}

impl PendingLoad {
    /// Start decoding an image file.
    pub fn image(path: PathBuf) -> Self {
        Self::spawn("Loading image...", move || {
            let image = media::load_image(&path)?;
            log::info!(
                "Loaded image: {} ({}x{})",
                path.display(),
                image.width(),
                image.height()
            );
            Ok(Loaded::Image { path, image })
        })
    }

    /// Start reading an annotation file.
    pub fn annotations(path: PathBuf) -> Self {
        Self::spawn("Loading annotations...", move || {
            let text = serialization::read_json(&path)?;
            log::info!("Read annotations: {} ({} bytes)", path.display(), text.len());
            Ok(Loaded::Annotations { path, text })
        })
    }

    fn spawn<F>(message: &str, job: F) -> Self
    where
        F: FnOnce() -> Result<Loaded> + Send + 'static,
    {
        let (sender, receiver) = channel();

        std::thread::spawn(move || {
            let _ = sender.send(job());
        });

        Self {
            receiver,
            message: message.to_string(),
        }
    }

    /// Status text shown while the load is running.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Return the result once it is available.
    pub fn poll(&self) -> Option<Result<Loaded>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(anyhow!("Loader thread exited"))),
        }
    }

    /// Block until the result is available.
    pub fn wait(self) -> Result<Loaded> {
        self.receiver
            .recv()
            .map_err(|_| anyhow!("Loader thread exited"))?
    }
}
