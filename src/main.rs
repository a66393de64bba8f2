// What the panel shows:
// • The webcam image, mirrored and cropped to fill the 24x32 LED panel.
// • After ~20 detector passes without a face, the fallback portrait instead.
// • The face silhouette mask goes to the controller alongside the colors.
// Keys: S connect serial, F fallback on/off, D mask overlay,
//       Up/Down brightness, Left/Right blue cut, ESC quits.

mod camera;
mod color;
mod config;
mod cover;
mod detector;
mod draw;
mod encoder;
mod error;
mod grid;
mod hull;
mod mask;
mod raster;
mod transport;
mod types;

use std::time::{Duration, Instant};

use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use camera::{CameraCapture, load_still_image};
use color::{BRIGHTNESS_RANGE, PixelFrame};
use config::{Cli, Config};
use cover::CoverTransform;
use detector::{KeypointFileDetector, LandmarkDetector, NoDetector, load_faces};
use draw::{Drawer, draw_led_preview, draw_mask_overlay, draw_text_5x7};
use encoder::{encode_face, encode_frame};
use error::Error;
use mask::{DetectionState, compute_face_mask};
use transport::{SerialTransport, Transport, send_frame};
use types::{FrameBuffer, Rgb};

fn init_tracing() -> Result<(), Error> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,led_face_mask=debug".into());

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init()
        .map_err(|e| Error::Tracing(e.to_string()))
}

fn main() -> Result<(), Error> {
    init_tracing()?;

    let cli = Cli::parse();
    let config = Config::load(&cli)?;
    info!("Configuration loaded");

    let layout = config.layout();
    let (canvas_w, canvas_h) = (layout.canvas_width(), layout.canvas_height());

    /* --- Camera + window --- */
    let mut cam = CameraCapture::new(config.camera.index, config.camera.width, config.camera.height)?;
    let mut drawer = Drawer::new("LED Face Mask", canvas_w, canvas_h)?;

    /* --- Detection state: live detector + optional fallback portrait --- */
    let mut detection = DetectionState::new(config.fallback.enabled, config.fallback.no_face_threshold);

    let fallback_image = match &config.fallback.image {
        Some(path) => Some(load_still_image(path)?),
        None => None,
    };
    match (&fallback_image, &config.fallback.keypoints) {
        (Some(_), Some(path)) => detection.on_fallback_result(load_faces(path)?),
        (Some(_), None) => warn!("Fallback image has no keypoint file; fallback stays off"),
        (None, Some(_)) => warn!("Fallback keypoints given without an image; ignored"),
        (None, None) => {}
    }

    let mut detector: Box<dyn LandmarkDetector> = match &config.detection.live_keypoints {
        Some(path) => {
            info!(path = %path.display(), "Live keypoints from file");
            Box::new(KeypointFileDetector::new(path))
        }
        None => {
            warn!("No live keypoint source configured; only the fallback mask will show");
            Box::new(NoDetector)
        }
    };
    let detect_every = config.detection.interval_ticks as u64;

    /* --- Serial link (connect now if a port is named, else on S) --- */
    let mut transport = SerialTransport::new(config.serial.port.clone(), config.serial.baud_rate);
    if transport.path().is_some() {
        transport.connect();
    }
    let send_interval = Duration::from_millis(config.serial.send_interval_ms);
    let mut last_sent: Option<Instant> = None;

    /* --- Reusable buffers --- */
    let mut canvas = FrameBuffer::new(canvas_w, canvas_h); // cover-rendered source
    let mut screen = FrameBuffer::new(canvas_w, canvas_h); // LED preview shown in the window

    let mut balance = config.color_balance();
    let mut brightness = config.color.brightness;
    let mut debug_face = config.debug_face;

    let mut last_cover: Option<CoverTransform> = None;
    let mut tick: u64 = 0;
    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;
    let mut hud_fps_text = String::from("FPS: 0.0");

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        let now = Instant::now();

        /* 1) Inputs */
        let controls = drawer.controls();
        if controls.connect_serial {
            transport.connect();
        }
        if controls.toggle_fallback {
            detection.set_fallback_enabled(!detection.fallback_enabled);
            info!(enabled = detection.fallback_enabled, "Fallback toggled");
        }
        if controls.toggle_debug {
            debug_face = !debug_face;
        }
        brightness = (brightness + controls.brightness_delta).clamp(BRIGHTNESS_RANGE.0, BRIGHTNESS_RANGE.1);
        balance.adjust_blue(controls.blue_delta);

        /* 2) Live frame; a bad frame only costs this tick's detection */
        let live = match cam.next_frame() {
            Ok(frame) => Some(frame),
            Err(e) => {
                warn!(error = %e, "Camera frame failed");
                None
            }
        };

        /* 3) Detector runs at a lower rate; its result is cached in `detection` */
        if let Some(frame) = live.as_ref().filter(|_| tick % detect_every == 0) {
            match detector.detect(frame) {
                Ok(faces) => detection.on_live_result(faces),
                Err(e) => warn!(error = %e, "Detection failed"),
            }
        }
        tick += 1;

        /* 4) Render the active source onto the canvas, then color-correct */
        let Some(source) = detection.active_source(live.as_ref(), fallback_image.as_ref()) else {
            drawer.present(&screen)?;
            continue;
        };
        let cover = CoverTransform::for_frames(source, canvas_w, canvas_h);
        if last_cover != Some(cover) {
            debug!(
                draw_w = cover.state.draw_w,
                draw_h = cover.state.draw_h,
                offset_x = cover.state.offset_x,
                offset_y = cover.state.offset_y,
                "Cover placement changed"
            );
            last_cover = Some(cover);
        }
        cover.render(source, &mut canvas);
        balance.apply_in_place(&mut canvas);

        /* 5) Sample one color per LED and mirror it in the window */
        let pixels = PixelFrame::sample(&canvas, &layout, brightness);
        draw_led_preview(&mut screen, &pixels, &layout);

        let send_due = transport.is_connected()
            && last_sent.is_none_or(|t| now.duration_since(t) > send_interval);

        if debug_face || send_due {
            let face_mask = compute_face_mask(&detection, &cover, &layout);

            if debug_face {
                draw_mask_overlay(&mut screen, &face_mask, &layout, Rgb::new(255, 0, 0), 120);
            }

            /* 6) Ship both lines; a dead link just drops them */
            if send_due {
                send_frame(&mut transport, &encode_frame(&pixels, &layout), &encode_face(&face_mask));
                last_sent = Some(now);
            }
        }

        /* 7) HUD + present */
        let mode = if detection.use_fallback { "FALLBACK" } else { "LIVE" };
        let serial = if transport.is_connected() { "ON" } else { "OFF" };
        let hud = format!(
            "{mode} | SERIAL {serial} | {hud_fps_text} | BRI {brightness:.1} BLU {:.2}",
            balance.blue_mult
        );
        draw_text_5x7(&mut screen, 6, 6, &hud, 0x00_FF_FF_FF);

        drawer.present(&screen)?;

        /* 8) FPS once per second */
        frames_this_second += 1;
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let secs = now.duration_since(last_fps_time).as_secs_f32();
            let fps = frames_this_second as f32 / secs;
            info!(fps = %format!("{fps:.1}"), mode, serial, "Frame rate");
            hud_fps_text = format!("FPS: {:.1}", fps);
            frames_this_second = 0;
            last_fps_time = now;
        }
    }

    info!("Window closed, exiting");
    Ok(())
}
