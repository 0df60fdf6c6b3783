mod lobby_steps;
