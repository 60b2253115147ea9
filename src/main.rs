//! tiny3d demo
//!
//! Spins a textured quad (and an OBJ model when one is given on the command
//! line) in a low-resolution frame, then scales the frame up to the window.
//!
//! Keys: W toggles the tiled rasterizer, D cycles the dither kernel, Z
//! toggles the depth test, F2 saves the config, Escape quits.

use macroquad::prelude::*;
use tiny3d::config::{load_config_or_default, save_config};
use tiny3d::model::{load_obj, Model};
use tiny3d::present::{fit_integer_scale, project_vertex, upscale_rgba};
use tiny3d::rasterizer as t3d;
use tiny3d::text::TextWriter;
use tiny3d::VERSION;

const CONFIG_PATH: &str = "tiny3d.ron";

/// Frames per full turn
const TURN_FRAMES: u32 = 240;

fn window_conf() -> Conf {
    Conf {
        window_title: format!("tiny3d v{}", VERSION),
        window_width: t3d::WIDTH as i32 * 3,
        window_height: t3d::HEIGHT as i32 * 3,
        window_resizable: true,
        ..Default::default()
    }
}

fn next_dither(kernel: t3d::DitherKernel) -> t3d::DitherKernel {
    use t3d::DitherKernel as K;
    match kernel {
        K::None => K::D2x2,
        K::D2x2 => K::D3x3,
        K::D3x3 => K::D4x4,
        K::D4x4 => K::D8x8,
        K::D8x8 => K::None,
    }
}

fn load_model_arg() -> Option<Model> {
    let path = std::env::args().nth(1)?;
    match load_obj(&path) {
        Ok(mut model) => {
            model.center();
            Some(model)
        }
        Err(e) => {
            log::error!("Failed to load {}: {}", path, e);
            None
        }
    }
}

/// Quad corners in model space, wound so the front faces the eye at rest.
fn quad(rot: &t3d::Matrix3x3, offset: t3d::Vector3, screen: &t3d::Image) -> [t3d::Vertex; 4] {
    let half = t3d::Real::ONE / 2;
    let corners = [(-half, -half), (half, -half), (half, half), (-half, half)];
    let uvs = [(0, 0), (1, 0), (1, 1), (0, 1)];
    let colors = [t3d::Color::RED, t3d::Color::GREEN, t3d::Color::BLUE, t3d::Color::WHITE];
    std::array::from_fn(|i| {
        let (x, y) = corners[i];
        let v = t3d::Vector3::new(x, y, t3d::Real::ZERO) * *rot + offset;
        t3d::Vertex::new(
            project_vertex(v, screen.width(), screen.height()),
            t3d::Vector2::from_ints(uvs[i].0, uvs[i].1),
            colors[i],
        )
    })
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = load_config_or_default(CONFIG_PATH);
    let mut screen = t3d::Image::with_dimensions(config.width, config.height);
    let mut zbuf = t3d::new_depth_buffer(&screen);

    let mut texture = t3d::Texture::checkerboard(
        64,
        8,
        t3d::Color::WHITE,
        t3d::Color::with_blend(200, 40, 40, t3d::BlendMode::Transparent),
    );
    texture.set_blend_modes(config.texture_blend_modes);

    let model = load_model_arg();
    let model_textures = model.as_ref().map(Model::load_textures).unwrap_or_default();
    let model_offset = model
        .as_ref()
        .map(|m| t3d::Vector3::new(t3d::Real::ZERO, t3d::Real::ZERO, m.radius() * 2 + 1))
        .unwrap_or_default();

    let mut writer = TextWriter::new();
    writer.set_caret(t3d::Point::new(2, 2));

    log::info!("tiny3d v{} at {}x{}", VERSION, config.width, config.height);

    let mut frame: u32 = 0;
    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }
        if is_key_pressed(KeyCode::W) {
            config.wide_rasterizer = !config.wide_rasterizer;
        }
        if is_key_pressed(KeyCode::D) {
            config.dither = next_dither(config.dither);
        }
        if is_key_pressed(KeyCode::Z) {
            config.depth_test = !config.depth_test;
        }
        if is_key_pressed(KeyCode::F2) {
            match save_config(&config, CONFIG_PATH) {
                Ok(()) => log::info!("Saved config to {}", CONFIG_PATH),
                Err(e) => log::error!("Failed to save config: {}", e),
            }
        }

        let settings = config.raster_settings();
        let turn = t3d::tau() * ((frame % TURN_FRAMES) as i32) / TURN_FRAMES as i32;
        let angle = t3d::wrap(-t3d::pi(), turn, t3d::pi());

        screen.fill(config.clear_color);
        t3d::clear_depth_buffer(&mut zbuf);

        // quad tumbling around x
        let x_axis = t3d::Vector3::from_ints(1, 0, 0);
        let rot = t3d::Matrix3x3::axis_angle(x_axis, angle);
        let offset = t3d::Vector3::from_ints(0, 0, 2);
        let [a, b, c, d] = quad(&rot, offset, &screen);
        let tex = Some(&texture as &dyn t3d::Sampler);
        for (p, q, r) in [(&a, &b, &c), (&c, &d, &a)] {
            let depth = if config.depth_test { Some(&mut zbuf) } else { None };
            if config.wide_rasterizer {
                t3d::draw_triangle_wide(&mut screen, depth, p, q, r, tex, &settings);
            } else {
                t3d::draw_triangle(&mut screen, depth, p, q, r, tex, &settings);
            }
        }

        // model spinning around y
        let mut triangles = 2;
        if let Some(model) = &model {
            let rot = t3d::Matrix3x3::axis_angle(t3d::Vector3::UP, angle);
            let depth = if config.depth_test { Some(&mut zbuf) } else { None };
            triangles += model.draw(
                &mut screen,
                depth,
                &rot,
                model_offset,
                &model_textures,
                &settings,
                config.wide_rasterizer,
            );
        }

        writer.set_shadow(config.hud_shadow);
        writer
            .write(&mut screen, "frame:")
            .write_int(&mut screen, frame as i32)
            .write(&mut screen, "\ntris:")
            .write_int(&mut screen, triangles as i32)
            .write(&mut screen, "\nangle:")
            .write_real(&mut screen, angle)
            .write(&mut screen, if config.wide_rasterizer { "\nwide" } else { "\nscalar" })
            .write(&mut screen, &format!("\n{:?}", config.dither));
        writer.reset_caret();

        // present
        let (x, y, w, h) = fit_integer_scale(
            (screen.width(), screen.height()),
            (screen_width() as u32, screen_height() as u32),
        );
        let rgba = upscale_rgba(&screen, w, h);
        let frame_texture = Texture2D::from_rgba8(w as u16, h as u16, &rgba);
        frame_texture.set_filter(FilterMode::Nearest);

        clear_background(BLACK);
        draw_texture(&frame_texture, x as f32, y as f32, WHITE);

        frame = frame.wrapping_add(1);
        next_frame().await;
    }
}
