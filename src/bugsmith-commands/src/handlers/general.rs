//! General commands.

/// `help` - list everything the bot understands.
pub fn help() -> String {
    "*Available commands:*\n\
     \n\
     *General:*\n\
     `help` - show this help message\n\
     `status` - show current channel status and project configuration\n\
     \n\
     *Project Management:*\n\
     `list projects` - list all available project configurations\n\
     `use project <name>` - bind channel to a project configuration\n\
     \n\
     *Bug Reports:*\n\
     `create bug report` - format your message into a structured bug report\n\
     `show bug template` - show the current bug report template\n\
     `edit bug template` - edit the bug report template\n\
     \n\
     *Documentation:*\n\
     `show project` - display project documentation/overview\n\
     `update docs` - update project documentation\n\
     `enable docs` - enable using project docs for bug reports\n\
     `disable docs` - disable using project docs for bug reports\n\
     \n\
     *Jira Configuration:*\n\
     `set jira token <token>` - set Jira API token\n\
     `set jira url <url>` - set Jira instance URL\n\
     `set jira email <email>` - set Jira email address\n\
     `set jira query <JQL>` - set JQL query for fetching bugs\n\
     `show jira query` - show current Jira JQL query\n\
     \n\
     *Jira Default Fields:*\n\
     `set jira defaults field=value` - set Jira default field values \
     (supports multiple: field1=value1 field2=value2)\n\
     `show jira defaults` - show all Jira default field values\n\
     `clear jira default <field>` - clear a Jira default field value\n\
     \n\
     *Jira Operations:*\n\
     `test jira` - test Jira connection for current project\n\
     `get bugs` - get list of Jira issues using the configured JQL query"
        .to_string()
}

/// Fallback for unrecognized text.
pub fn unknown() -> String {
    "I did not understand that command. Type `help` to see what I can do.".to_string()
}
