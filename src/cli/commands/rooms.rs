use anyhow::{Result, bail};

use super::{connect, resolve_room_id};
use crate::cli::RoomsCommand;
use crate::config::ConfigFile;
use crate::ui::Style;

pub async fn run_rooms(config: &ConfigFile, action: RoomsCommand) -> Result<()> {
    let client = connect(config)?;

    match action {
        RoomsCommand::List { title: Some(title) } => {
            let Some(id) = client.find_room_id_by_title(&title).await? else {
                bail!("Room '{title}' not found");
            };
            println!("{id}");
        }
        RoomsCommand::List { title: None } => {
            let rooms = client.list_rooms().await?;
            if rooms.is_empty() {
                println!("{}", Style::hint("The bot is not a member of any room."));
            }
            for room in rooms {
                println!("{}  {}", Style::secondary(&room.id), Style::value(&room.title));
            }
        }
        RoomsCommand::Create { title } => {
            let id = client.create_room(&title).await?;
            println!("{id}");
        }
        RoomsCommand::Delete(target) => {
            let id = resolve_room_id(&client, &target).await?;
            client.delete_room(&id).await?;
            println!("{} {id}", Style::success("Deleted room"));
        }
    }

    Ok(())
}
