use bevy::{
    input::{keyboard::KeyboardInput, ButtonState},
    prelude::*,
};

use crate::{
    configuration::GameConfiguration,
    snake::{Cell, Direction, Mode, SnakeGame, SnakeGameSnapshot, TickOutcome},
};

use self::{components::*, events::GameTick, resources::GameTimerResource};

use self::{
    events::{FoodAteEvent, GameOverEvent},
    resources::DrawConfigurationResource,
};

// The frame sits below the board, food and snake never overlap
const FRAME_Z: f32 = 0.;
const BOARD_Z: f32 = 0.5;
const FOOD_Z: f32 = 1.;
const SNAKE_Z: f32 = 1.;

const FRAME_WIDTH: f32 = 4.;

const BOARD_COLOR: Color = Color::rgb(0.12, 0.13, 0.16);
const WALLS_COLOR: Color = Color::rgb(0.55, 0.56, 0.6);
const PASS_THROUGH_COLOR: Color = Color::rgb(0.2, 0.5, 0.85);
const GAME_OVER_COLOR: Color = Color::rgb(0.85, 0.2, 0.2);
const HEAD_COLOR: Color = Color::rgb(0.3, 0.9, 0.45);
const BODY_COLOR: Color = Color::rgb(0.15, 0.7, 0.3);
const FOOD_COLOR: Color = Color::rgb(0.95, 0.25, 0.25);

pub struct SnakePlugin {
    pub rect: UiRect<f32>,
    pub configuration: GameConfiguration,
}

impl Plugin for SnakePlugin {
    fn build(&self, app: &mut App) {
        let snake_game = self.configuration.new_game();

        let grid_size = snake_game.grid_size() as f32;

        let cell_width = (self.rect.right - self.rect.left) / grid_size;
        let cell_height = (self.rect.top - self.rect.bottom) / grid_size;
        let cell_size = cell_height.min(cell_width);

        let snapshot = snake_game.snapshot();

        app.insert_resource(snapshot)
            .insert_resource(snake_game)
            .insert_resource(DrawConfigurationResource {
                cell_size,
                half_cell: cell_size / 2.,
                board_size: cell_size * grid_size,
                origin: (self.rect.left, self.rect.top),
            })
            .insert_resource(GameTimerResource(Timer::new(
                self.configuration.tick_interval,
                true,
            )))
            .init_resource::<SpriteBundles>()
            .add_event::<GameOverEvent>()
            .add_event::<FoodAteEvent>()
            .add_event::<GameTick>()
            .add_startup_system(draw_field)
            .add_startup_system(draw_snake)
            .add_system(game_tick.label("clock"))
            .add_system(handle_input.label("input"))
            .add_system(play.label("play").after("clock").after("input"))
            .add_system(update_snake_head.after("play"))
            .add_system(update_snake_body.after("play"))
            .add_system(update_food.after("play"))
            .add_system(update_frame.after("play"))
            .add_system(game_over.after("play"));
    }
}

/// What a key press asks of the game. Which keys map to what is purely a UI
/// decision, the game only sees the resulting calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start an idle game, or restart a finished one.
    StartOrRestart,
    Turn(Direction),
    ToggleMode,
}

impl Command {
    pub fn from_key(key_code: KeyCode) -> Option<Self> {
        match key_code {
            KeyCode::Space => Some(Command::StartOrRestart),
            KeyCode::Up | KeyCode::W => Some(Command::Turn(Direction::Up)),
            KeyCode::Down | KeyCode::S => Some(Command::Turn(Direction::Down)),
            KeyCode::Left | KeyCode::A => Some(Command::Turn(Direction::Left)),
            KeyCode::Right | KeyCode::D => Some(Command::Turn(Direction::Right)),
            KeyCode::M => Some(Command::ToggleMode),
            _ => None,
        }
    }

    /// Applies the command, re-arming the clock whenever a new run begins.
    /// Returns whether the game changed.
    pub fn apply(self, snake_game: &mut SnakeGame, timer: &mut Timer) -> bool {
        match self {
            Command::StartOrRestart if snake_game.is_over() => {
                snake_game.reset();
                rearm(timer);
                true
            }
            Command::StartOrRestart => {
                let started = snake_game.start(Direction::Right);
                if started {
                    rearm(timer);
                }
                started
            }
            Command::Turn(direction) => snake_game.request_direction(direction),
            Command::ToggleMode => {
                let mode = snake_game.mode().toggled();
                snake_game.set_mode(mode)
            }
        }
    }
}

fn rearm(timer: &mut Timer) {
    timer.reset();
    timer.unpause();
}

fn game_tick(
    time: Res<Time>,
    mut game_timers: ResMut<GameTimerResource>,
    mut tick_event_writer: EventWriter<GameTick>,
) {
    let game_timers = &mut game_timers.0;
    if !game_timers.tick(time.delta()).just_finished() {
        return;
    }

    debug!("tick!");

    tick_event_writer.send(GameTick);
}

fn handle_input(
    mut keyboard_input_events: EventReader<KeyboardInput>,
    mut snake_game: ResMut<SnakeGame>,
    mut snapshot: ResMut<SnakeGameSnapshot>,
    mut game_timers: ResMut<GameTimerResource>,
) {
    let commands: Vec<Command> = keyboard_input_events
        .iter()
        .filter(|ki| matches!(ki.state, ButtonState::Pressed))
        .filter_map(|ki| ki.key_code)
        .filter_map(Command::from_key)
        .collect();

    let mut changed = false;
    for command in commands {
        changed |= command.apply(&mut snake_game, &mut game_timers.0);
    }

    if changed {
        *snapshot = snake_game.snapshot();
    }
}

fn play(
    mut tick_event: EventReader<GameTick>,
    mut snake_game: ResMut<SnakeGame>,
    mut snapshot: ResMut<SnakeGameSnapshot>,
    mut food_ate_event_writer: EventWriter<FoodAteEvent>,
    mut game_over_event_writer: EventWriter<GameOverEvent>,
) {
    if tick_event.iter().count() == 0 {
        return;
    }

    match snake_game.tick() {
        TickOutcome::Idle => return,
        TickOutcome::Moved => {}
        TickOutcome::Ate => food_ate_event_writer.send(FoodAteEvent),
        TickOutcome::GameOver(collision) => {
            game_over_event_writer.send(GameOverEvent { collision })
        }
    }

    *snapshot = snake_game.snapshot();
}

fn update_snake_head(
    draw_configuration: Res<DrawConfigurationResource>,
    snapshot: Res<SnakeGameSnapshot>,
    mut head_snake_query: Query<&mut Transform, With<HeadSnakeComponent>>,
) {
    if !snapshot.is_changed() {
        return;
    }

    if let Some(mut transform) = head_snake_query.iter_mut().next() {
        move_to(&mut transform, &snapshot.head(), &draw_configuration);
    }
}

fn update_snake_body(
    mut commands: Commands,
    bundles: Res<SpriteBundles>,
    draw_configuration: Res<DrawConfigurationResource>,
    snapshot: Res<SnakeGameSnapshot>,
    mut body_snake_query: Query<(Entity, &mut Transform), With<BodySnakeComponent>>,
) {
    if !snapshot.is_changed() {
        return;
    }

    let mut bodies = body_snake_query.iter_mut();
    for snake_body_position in snapshot.snake.iter().skip(1) {
        match bodies.next() {
            Some(mut e) => {
                move_to(&mut e.1, snake_body_position, &draw_configuration);
            }
            None => {
                spawn_snake_body(
                    &mut commands,
                    &bundles,
                    snake_body_position,
                    &draw_configuration,
                );
            }
        }
    }

    // A reset shrinks the snake back to its head
    bodies.for_each(|p| {
        commands.entity(p.0).despawn();
    });
}

fn update_food(
    draw_configuration: Res<DrawConfigurationResource>,
    snapshot: Res<SnakeGameSnapshot>,
    mut food_query: Query<&mut Transform, With<FoodComponent>>,
) {
    if !snapshot.is_changed() {
        return;
    }

    if let Some(mut food_position) = food_query.iter_mut().next() {
        move_to(&mut food_position, &snapshot.food, &draw_configuration);
    }
}

fn update_frame(
    snapshot: Res<SnakeGameSnapshot>,
    mut frame_query: Query<&mut Sprite, With<FrameComponent>>,
) {
    if !snapshot.is_changed() {
        return;
    }

    for mut sprite in frame_query.iter_mut() {
        sprite.color = frame_color(&snapshot);
    }
}

fn game_over(
    mut game_over_event_reader: EventReader<GameOverEvent>,
    mut game_timers: ResMut<GameTimerResource>,
) {
    if game_over_event_reader.iter().count() == 0 {
        return;
    }

    let game_timers = &mut game_timers.0;
    game_timers.pause();
}

fn frame_color(snapshot: &SnakeGameSnapshot) -> Color {
    if snapshot.over {
        return GAME_OVER_COLOR;
    }
    match snapshot.mode {
        Mode::Walls => WALLS_COLOR,
        Mode::PassThrough => PASS_THROUGH_COLOR,
    }
}

fn draw_snake(
    mut commands: Commands,
    bundles: Res<SpriteBundles>,
    draw_configuration: Res<DrawConfigurationResource>,
    snapshot: Res<SnakeGameSnapshot>,
) {
    for (i, position) in snapshot.snake.iter().enumerate() {
        let is_head = i == 0;

        if is_head {
            let mut snake_head = bundles.snake_head();

            move_to(&mut snake_head.transform, position, &draw_configuration);
            snake_head.transform.translation.z = SNAKE_Z;

            commands.spawn_bundle(snake_head).insert(HeadSnakeComponent);
        } else {
            spawn_snake_body(&mut commands, &bundles, position, &draw_configuration);
        };
    }
}

fn draw_field(
    mut commands: Commands,
    bundles: Res<SpriteBundles>,
    draw_configuration: Res<DrawConfigurationResource>,
    snapshot: Res<SnakeGameSnapshot>,
) {
    let board_size = draw_configuration.board_size;
    let center = Vec2::new(
        draw_configuration.origin.0 + board_size / 2.,
        draw_configuration.origin.1 - board_size / 2.,
    );

    commands
        .spawn_bundle(SpriteBundle {
            sprite: Sprite {
                color: frame_color(&snapshot),
                custom_size: Some(Vec2::splat(board_size + 2. * FRAME_WIDTH)),
                ..default()
            },
            transform: Transform::from_translation(center.extend(FRAME_Z)),
            ..default()
        })
        .insert(FrameComponent);

    commands.spawn_bundle(SpriteBundle {
        sprite: Sprite {
            color: BOARD_COLOR,
            custom_size: Some(Vec2::splat(board_size)),
            ..default()
        },
        transform: Transform::from_translation(center.extend(BOARD_Z)),
        ..default()
    });

    // Create initial food
    let mut food = bundles.food();
    move_to(&mut food.transform, &snapshot.food, &draw_configuration);
    food.transform.translation.z = FOOD_Z;

    commands.spawn_bundle(food).insert(FoodComponent);
}

fn spawn_snake_body(
    commands: &mut Commands,
    bundles: &SpriteBundles,
    position: &Cell,
    draw_configuration: &DrawConfigurationResource,
) {
    let mut sprite = bundles.snake_body();
    move_to(&mut sprite.transform, position, draw_configuration);
    sprite.transform.translation.z = SNAKE_Z;

    commands.spawn_bundle(sprite).insert(BodySnakeComponent);
}

/// Grid rows grow downwards, bevy's `y` grows upwards.
fn move_to(transform: &mut Transform, to: &Cell, draw_configuration: &DrawConfigurationResource) {
    transform.translation.x = to.x as f32 * draw_configuration.cell_size
        + draw_configuration.origin.0
        + draw_configuration.half_cell;
    transform.translation.y = draw_configuration.origin.1
        - to.y as f32 * draw_configuration.cell_size
        - draw_configuration.half_cell;
}

pub struct SpriteBundles {
    snake_head: SpriteBundle,
    snake_body: SpriteBundle,
    food: SpriteBundle,
}
impl SpriteBundles {
    pub fn snake_body(&self) -> SpriteBundle {
        self.snake_body.clone()
    }
    pub fn snake_head(&self) -> SpriteBundle {
        self.snake_head.clone()
    }
    pub fn food(&self) -> SpriteBundle {
        self.food.clone()
    }
}
impl FromWorld for SpriteBundles {
    fn from_world(world: &mut World) -> Self {
        let draw_configuration = world.resource::<DrawConfigurationResource>();

        // leave a hairline between cells so the body reads as segments
        let size = Vec2::splat(draw_configuration.cell_size - 2.);

        SpriteBundles {
            snake_head: cell_sprite(HEAD_COLOR, size),
            snake_body: cell_sprite(BODY_COLOR, size),
            food: cell_sprite(FOOD_COLOR, size),
        }
    }
}

fn cell_sprite(color: Color, size: Vec2) -> SpriteBundle {
    SpriteBundle {
        sprite: Sprite {
            color,
            custom_size: Some(size),
            ..default()
        },
        ..default()
    }
}

mod resources {
    use bevy::time::Timer;

    #[derive(Clone)]
    pub struct DrawConfigurationResource {
        pub half_cell: f32,
        pub cell_size: f32,
        pub board_size: f32,
        /// Top left corner of the board.
        pub origin: (f32, f32),
    }

    pub struct GameTimerResource(pub Timer);
}

pub mod events {
    use crate::snake::Collision;

    pub struct GameTick;

    pub struct GameOverEvent {
        pub collision: Collision,
    }
    pub struct FoodAteEvent;
}

mod components {
    use bevy::prelude::Component;

    #[derive(Component)]
    pub struct HeadSnakeComponent;

    #[derive(Component)]
    pub struct BodySnakeComponent;

    #[derive(Component)]
    pub struct FoodComponent;

    #[derive(Component)]
    pub struct FrameComponent;
}
