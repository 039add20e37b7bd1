use bevy::prelude::*;
use configuration::GameConfiguration;
use snake::SnakeGameSnapshot;
use snake_plugin::{
    events::{FoodAteEvent, GameOverEvent},
    SnakePlugin,
};

pub mod configuration;
pub mod snake;
mod snake_plugin;

pub use snake_plugin::Command;

pub struct MainPlugin;
impl Plugin for MainPlugin {
    fn build(&self, app: &mut App) {
        let configuration = app
            .world
            .get_resource::<GameConfiguration>()
            .cloned()
            .unwrap_or_default();
        let window_description = app
            .world
            .get_resource::<WindowDescriptor>()
            .cloned()
            .unwrap_or_else(|| WindowDescriptor {
                width: configuration.window_width,
                height: configuration.window_height,
                ..default()
            });

        let padding = 10.;
        // calculate the region where to put the game
        let top = window_description.height / 2. - padding;
        let bottom = -window_description.height / 2. + padding;
        let right = window_description.width / 2. - padding;
        let left = -window_description.width / 2. + padding;

        app.add_startup_system(setup)
            .add_system(show_game_over.after("play"))
            .add_system(announce_food.after("play"))
            .add_system(update_title.after("play"))
            .add_plugin(SnakePlugin {
                rect: UiRect {
                    top,
                    left,
                    right,
                    bottom,
                },
                configuration,
            });
    }
}

fn show_game_over(
    mut game_over_event_reader: EventReader<GameOverEvent>,
    snapshot: Res<SnakeGameSnapshot>,
) {
    for event in game_over_event_reader.iter() {
        warn!("Game over! {}, score: {}", event.collision, snapshot.score);
    }
}

fn announce_food(
    mut food_ate_event_reader: EventReader<FoodAteEvent>,
    snapshot: Res<SnakeGameSnapshot>,
) {
    if food_ate_event_reader.iter().count() == 0 {
        return;
    }

    info!(
        "Yum! length {}, score: {}",
        snapshot.snake.len(),
        snapshot.score
    );
}

fn update_title(snapshot: Res<SnakeGameSnapshot>, windows: Option<ResMut<Windows>>) {
    if !snapshot.is_changed() {
        return;
    }

    // headless runs have no window
    let Some(mut windows) = windows else {
        return;
    };
    if let Some(window) = windows.get_primary_mut() {
        window.set_title(status_line(&snapshot));
    }
}

fn setup(mut commands: Commands) {
    commands.spawn_bundle(Camera2dBundle::default());
}

pub fn status_line(snapshot: &SnakeGameSnapshot) -> String {
    let score = format!("Score: {} | {} mode", snapshot.score, snapshot.mode);
    if snapshot.over {
        format!("Game over! {} | SPACE to restart", score)
    } else if !snapshot.started {
        format!("{} | SPACE to start, M to switch mode", score)
    } else {
        format!("{} | WASD or arrows to move", score)
    }
}
