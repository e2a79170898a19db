use bevy::prelude::*;
use rhythm_shared::all_stages;

use crate::{
    AppState, Paused,
    stage::{CurrentTrack, request_track},
};

const BUTTON_IDLE: Color = Color::srgba(0.0, 0.0, 0.0, 0.6);
const BUTTON_HOVER: Color = Color::srgba(0.25, 0.25, 0.25, 0.8);
const BUTTON_CURRENT: Color = Color::srgba(0.5, 0.1, 0.1, 0.8);

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, spawn_menu);
    app.add_systems(
        Update,
        (
            pick_track,
            show_menu,
            style_buttons,
            show_loading.run_if(state_changed::<AppState>),
        ),
    );
}

#[derive(Component)]
struct TrackMenu;

#[derive(Component)]
struct TrackButton(u32);

#[derive(Component)]
struct LoadingLabel;

fn spawn_menu(mut commands: Commands) {
    commands
        .spawn((
            Name::new("TrackMenu"),
            TrackMenu,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                row_gap: Val::Px(6.0),
                ..default()
            },
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("Rhythm Walk"),
                TextFont::from_font_size(32.0),
                Node {
                    margin: UiRect::bottom(Val::Px(12.0)),
                    ..default()
                },
            ));
            for stage in all_stages() {
                parent
                    .spawn((
                        Button,
                        TrackButton(stage.track),
                        Node {
                            width: Val::Px(260.0),
                            padding: UiRect::axes(Val::Px(12.0), Val::Px(4.0)),
                            ..default()
                        },
                        BackgroundColor(BUTTON_IDLE),
                    ))
                    .with_child((
                        Text::new(format!("{:02}  {}", stage.track, stage.title)),
                        TextFont::from_font_size(18.0),
                    ));
            }
        });

    commands.spawn((
        Name::new("LoadingLabel"),
        LoadingLabel,
        Text::new("Loading..."),
        TextFont::from_font_size(24.0),
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(24.0),
            right: Val::Px(24.0),
            ..default()
        },
        Visibility::Hidden,
    ));
}

fn pick_track(
    buttons: Query<(&Interaction, &TrackButton), Changed<Interaction>>,
    mut current: ResMut<CurrentTrack>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    for (interaction, button) in &buttons {
        if *interaction == Interaction::Pressed {
            request_track(button.0, &mut current, &mut next_state);
        }
    }
}

/// The menu is up in `Menu` and whenever the pointer has been released mid-stage.
fn show_menu(
    state: Res<State<AppState>>,
    paused: Res<Paused>,
    mut menu: Single<&mut Visibility, With<TrackMenu>>,
) {
    let visible = match state.get() {
        AppState::Menu => true,
        AppState::Loading => false,
        AppState::Playing => paused.0,
    };
    menu.set_if_neq(if visible {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    });
}

fn show_loading(
    state: Res<State<AppState>>,
    mut label: Single<&mut Visibility, (With<LoadingLabel>, Without<TrackMenu>)>,
) {
    **label = if *state.get() == AppState::Loading {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    };
}

fn style_buttons(
    current: Res<CurrentTrack>,
    mut buttons: Query<(&Interaction, &TrackButton, &mut BackgroundColor)>,
) {
    for (interaction, button, mut background) in &mut buttons {
        let color = match interaction {
            _ if current.0 == Some(button.0) => BUTTON_CURRENT,
            Interaction::Hovered | Interaction::Pressed => BUTTON_HOVER,
            Interaction::None => BUTTON_IDLE,
        };
        background.set_if_neq(BackgroundColor(color));
    }
}
