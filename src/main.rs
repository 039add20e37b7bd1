use bevy::prelude::*;

use grid_snake::{configuration::GameConfiguration, MainPlugin};

fn main() {
    let (configuration, configuration_error) = match GameConfiguration::from_env() {
        Ok(configuration) => (configuration, None),
        Err(error) => (GameConfiguration::default(), Some(error)),
    };

    let mut app = App::new();
    app.insert_resource(WindowDescriptor {
        title: "Snake".to_string(),
        width: configuration.window_width,
        height: configuration.window_height,
        resizable: false,
        ..default()
    })
    .add_plugins(DefaultPlugins);

    // logging is only up once DefaultPlugins are in
    if let Some(error) = configuration_error {
        warn!("{}, falling back to defaults", error);
    }

    app.insert_resource(configuration).add_plugin(MainPlugin).run();
}
