//! Fixed document templates spliced by the code generator.
//!
//! Everything here is emitted verbatim except for the two LLM placeholder
//! tokens in [`RUNTIME`], which the generator replaces with JSON-encoded
//! strings or the bare word `null`.

/// Stylesheet for the menu bar, canvas, dialog panel, and splash screen.
pub(super) const CSS: &str = r##"
* {
    margin: 0;
    padding: 0;
    box-sizing: border-box;
}

body {
    font-family: Arial, sans-serif;
    background: #1a1a1a;
    color: #fff;
    overflow: hidden;
}

#menu-bar {
    background: #2a2a2a;
    padding: 10px;
    display: flex;
    gap: 10px;
    border-bottom: 2px solid #444;
}

.menu-button {
    background: #444;
    color: #fff;
    border: 1px solid #666;
    padding: 8px 16px;
    cursor: pointer;
    border-radius: 4px;
}

.menu-button:hover {
    background: #555;
}

.dropdown {
    position: relative;
    display: inline-block;
}

.dropdown-content {
    display: none;
    position: absolute;
    background: #333;
    min-width: 200px;
    box-shadow: 0 8px 16px rgba(0,0,0,0.3);
    z-index: 1000;
    max-height: 400px;
    overflow-y: auto;
    border: 1px solid #555;
    border-radius: 4px;
    top: 100%;
    left: 0;
    margin-top: 5px;
}

.dropdown-content.show {
    display: block;
}

.dropdown-content div {
    padding: 10px;
    border-bottom: 1px solid #444;
}

#game-container {
    position: relative;
    width: 100vw;
    height: calc(100vh - 50px);
    overflow: hidden;
}

#game-canvas {
    position: absolute;
    top: 50%;
    left: 50%;
    transform: translate(-50%, -50%);
    image-rendering: pixelated;
}

#dialog-panel {
    position: fixed;
    right: -400px;
    top: 60px;
    width: 350px;
    height: calc(100vh - 60px);
    background: #2a2a2a;
    border-left: 2px solid #444;
    transition: right 0.3s;
    padding: 20px;
    overflow-y: auto;
}

#dialog-panel.show {
    right: 0;
}

#dialog-content {
    margin-bottom: 20px;
}

#dialog-input {
    width: 100%;
    padding: 10px;
    background: #333;
    color: #fff;
    border: 1px solid #555;
    border-radius: 4px;
}

#dialog-close {
    position: absolute;
    top: 10px;
    right: 10px;
    background: #444;
    color: #fff;
    border: 1px solid #666;
    padding: 5px 10px;
    cursor: pointer;
    border-radius: 4px;
    font-size: 16px;
    z-index: 10;
}

#dialog-close:hover {
    background: #555;
}

.interaction-text {
    position: absolute;
    background: rgba(0,0,0,0.8);
    color: #fff;
    padding: 5px 10px;
    border-radius: 4px;
    pointer-events: none;
    z-index: 100;
    font-size: 12px;
}

.popup-text {
    position: absolute;
    background: rgba(255,255,0,0.9);
    color: #000;
    padding: 5px 10px;
    border-radius: 4px;
    pointer-events: none;
    z-index: 101;
    font-size: 12px;
    animation: fadeOut 3s forwards;
}

@keyframes fadeOut {
    0% { opacity: 1; }
    70% { opacity: 1; }
    100% { opacity: 0; }
}

#splash-screen {
    display: none;
    position: fixed;
    top: 0;
    left: 0;
    width: 100%;
    height: 100%;
    background: rgba(0, 0, 0, 0.85);
    z-index: 1000;
    justify-content: center;
    align-items: center;
}

#splash-screen.show {
    display: flex;
}

#splash-content {
    background: linear-gradient(135deg, #1e3c72 0%, #2a5298 100%);
    padding: 40px;
    border-radius: 15px;
    box-shadow: 0 10px 40px rgba(0, 0, 0, 0.5);
    max-width: 600px;
    width: 90%;
    text-align: center;
    color: white;
    border: 2px solid rgba(255, 255, 255, 0.2);
}

#splash-title {
    font-size: 2.5em;
    margin: 0 0 20px 0;
    text-shadow: 2px 2px 4px rgba(0, 0, 0, 0.5);
    color: #ffd700;
}

#splash-text {
    font-size: 1.2em;
    line-height: 1.8;
    margin: 20px 0;
    color: #ffffff;
}

#splash-text p {
    margin: 10px 0;
}

#splash-close {
    margin-top: 30px;
    padding: 15px 40px;
    font-size: 1.2em;
    background: #4CAF50;
    color: white;
    border: none;
    border-radius: 8px;
    cursor: pointer;
    transition: background 0.3s;
    box-shadow: 0 4px 6px rgba(0, 0, 0, 0.3);
}

#splash-close:hover {
    background: #45a049;
    transform: translateY(-2px);
    box-shadow: 0 6px 8px rgba(0, 0, 0, 0.4);
}

#splash-close:active {
    transform: translateY(0);
}
"##;

/// Document body: menu bar, canvas container, dialog panel, splash screen,
/// and the small helper script the inline `onclick` handlers rely on.
pub(super) const BODY: &str = r##"
<div id="menu-bar">
    <button class="menu-button" onclick="game.saveGame()">Save</button>
    <button class="menu-button" onclick="document.getElementById('load-input').click()">
        Load
        <input type="file" id="load-input" accept=".json" style="display:none" onchange="game.loadGame(event)">
    </button>
    <div class="dropdown">
        <button class="menu-button" onclick="toggleDropdown('status-dropdown')">Status</button>
        <div id="status-dropdown" class="dropdown-content">
            <div id="status-content"></div>
        </div>
    </div>
    <div class="dropdown">
        <button class="menu-button" onclick="toggleDropdown('inventory-dropdown')">Inventory</button>
        <div id="inventory-dropdown" class="dropdown-content">
            <div id="inventory-content"></div>
        </div>
    </div>
    <div class="dropdown">
        <button class="menu-button" onclick="toggleDropdown('chat-dropdown')">Chat History</button>
        <div id="chat-dropdown" class="dropdown-content">
            <div id="chat-content"></div>
        </div>
    </div>
    <div class="dropdown">
        <button class="menu-button" onclick="toggleDropdown('quest-dropdown')">Quest-Status</button>
        <div id="quest-dropdown" class="dropdown-content">
            <div id="quest-content"></div>
        </div>
    </div>
</div>
<div id="game-container">
    <canvas id="game-canvas"></canvas>
</div>
<div id="dialog-panel">
    <button id="dialog-close" onclick="game.closeDialog()">&times; Close</button>
    <div id="dialog-content"></div>
    <input type="text" id="dialog-input" placeholder="Type message..." style="display:none" onkeypress="handleDialogInput(event)">
</div>
<div id="splash-screen">
    <div id="splash-content">
        <h1 id="splash-title"></h1>
        <div id="splash-text"></div>
        <button id="splash-close" onclick="game.closeSplashScreen()">Start Game</button>
    </div>
</div>
<script>
    function toggleDropdown(id) {
        document.getElementById(id).classList.toggle('show');
    }

    function handleDialogInput(event) {
        if (event.key === 'Enter') {
            const input = document.getElementById('dialog-input');
            const message = input.value;
            if (message.trim()) {
                game.handleDialogInput(message);
                input.value = '';
            }
        }
    }

    // Close any open dropdown when clicking elsewhere.
    window.onclick = function(event) {
        if (!event.target.matches('.menu-button')) {
            for (let dropdown of document.getElementsByClassName('dropdown-content')) {
                dropdown.classList.remove('show');
            }
        }
    };
</script>
"##;

/// The embedded game engine. `LLM_ENDPOINT_PLACEHOLDER` and
/// `LLM_TOKEN_PLACEHOLDER` each appear exactly once and are substituted by
/// the generator.
pub(super) const RUNTIME: &str = r##"
class DungeonGame {
    constructor() {
        this.state = JSON.parse(JSON.stringify(INITIAL_GAME_STATE));
        this.canvas = document.getElementById('game-canvas');
        this.ctx = this.canvas.getContext('2d');
        this.cellSize = 40;
        this.zoom = 1.0;
        this.viewportX = 0;
        this.viewportY = 0;
        this.panning = false;
        this.currentDialogNPC = null;
        this.lastDialogOpenTime = 0;
        this.interactionTexts = [];
        this.llmEndpoint = LLM_ENDPOINT_PLACEHOLDER;
        this.llmToken = LLM_TOKEN_PLACEHOLDER;
        this.npcInteractionHistory = {};

        this.init();
        this.setupEventListeners();
        this.gameLoop();
    }

    init() {
        this.resizeCanvas();
        this.placeRandomEntities();
        this.centerOnUser();
        this.updateUI();
        this.showSplashScreen();
    }

    resizeCanvas() {
        const container = document.getElementById('game-container');
        this.canvas.width = container.clientWidth;
        this.canvas.height = container.clientHeight;
    }

    // Resolve deferred random placements once; a P% placement has a P in
    // 100 chance of spawning at all.
    placeRandomEntities() {
        const roll = (entity) => {
            if (entity.placement && entity.placement.type === 'random') {
                if (Math.random() * 100 < entity.placement.percentage) {
                    entity.position = [
                        Math.floor(Math.random() * this.state.world.width),
                        Math.floor(Math.random() * this.state.world.height)
                    ];
                }
            }
        };
        this.state.mythics.forEach(roll);
        this.state.items.forEach(roll);
        this.state.monsters.forEach(roll);
        this.state.npcs.forEach(roll);
    }

    setupEventListeners() {
        document.addEventListener('keydown', (e) => {
            if (e.key === 'ArrowUp' && !e.shiftKey) {
                this.moveUser(0, -1);
            } else if (e.key === 'ArrowDown' && !e.shiftKey) {
                this.moveUser(0, 1);
            } else if (e.key === 'ArrowLeft' && !e.shiftKey) {
                this.moveUser(-1, 0);
            } else if (e.key === 'ArrowRight' && !e.shiftKey) {
                this.moveUser(1, 0);
            } else if (e.key === 'Enter' || e.key === ' ') {
                this.handleEnterKey();
            } else if (e.key === 'Escape') {
                this.closeDialog();
            } else if (e.key === '+' || e.key === '=') {
                this.zoomIn();
            } else if (e.key === '-') {
                this.zoomOut();
            }
        });

        let shiftPressed = false;
        document.addEventListener('keydown', (e) => {
            if (e.key === 'Shift') shiftPressed = true;
            if (shiftPressed && e.key.startsWith('Arrow')) {
                this.panning = true;
                if (e.key === 'ArrowUp') this.viewportY -= 5;
                if (e.key === 'ArrowDown') this.viewportY += 5;
                if (e.key === 'ArrowLeft') this.viewportX -= 5;
                if (e.key === 'ArrowRight') this.viewportX += 5;
            }
        });
        document.addEventListener('keyup', (e) => {
            if (e.key === 'Shift') {
                shiftPressed = false;
                this.panning = false;
                this.centerOnUser();
            }
        });

        window.addEventListener('resize', () => this.resizeCanvas());
    }

    moveUser(dx, dy) {
        const newX = this.state.user.position[0] + dx;
        const newY = this.state.user.position[1] + dy;

        if (newX < 0 || newX >= this.state.world.width ||
            newY < 0 || newY >= this.state.world.height) {
            return;
        }
        if (!this.canMoveTo(newX, newY)) {
            return;
        }

        this.state.user.position[0] = newX;
        this.state.user.position[1] = newY;

        this.checkPickups();
        if (!this.panning) {
            this.centerOnUser();
        }

        this.evaluateRules();
        this.evaluateQuests();
        this.checkEndGame();
        this.updateUI();
    }

    blockedByFurniture(x, y) {
        for (let furniture of this.state.furniture) {
            const blocking = furniture.name === 'wall' || furniture.name === 'stone';
            if (!blocking) continue;
            if (furniture.placement.type === 'coordinate') {
                const pos = furniture.placement.coord;
                if (pos[0] === x && pos[1] === y) return true;
            } else if (furniture.placement.type === 'range') {
                const [c1, c2] = [furniture.placement.coord1, furniture.placement.coord2];
                const minX = Math.min(c1[0], c2[0]), maxX = Math.max(c1[0], c2[0]);
                const minY = Math.min(c1[1], c2[1]), maxY = Math.max(c1[1], c2[1]);
                if (x >= minX && x <= maxX && y >= minY && y <= maxY) return true;
            }
        }
        return false;
    }

    canMoveTo(x, y) {
        if (this.blockedByFurniture(x, y)) return false;
        for (let npc of this.state.npcs) {
            if (npc.position && npc.position[0] === x && npc.position[1] === y) {
                return false;
            }
        }
        for (let monster of this.state.monsters) {
            if (!monster.defeated && monster.position &&
                monster.position[0] === x && monster.position[1] === y) {
                return false;
            }
        }
        return true;
    }

    checkPickups() {
        const userPos = this.state.user.position;
        let pickedUpSomething = false;

        for (let mythic of this.state.mythics) {
            if (!mythic.picked_up && mythic.position &&
                mythic.position[0] === userPos[0] && mythic.position[1] === userPos[1]) {
                if (mythic.can_pickup) {
                    this.state.user.inventory.push(mythic.unique_name);
                    mythic.picked_up = true;
                    pickedUpSomething = true;
                    this.showInteractionText(userPos[0], userPos[1], `Picked up ${mythic.unique_name}`);
                } else {
                    this.showInteractionText(userPos[0], userPos[1], mythic.catch_message);
                }
            }
        }

        for (let item of this.state.items) {
            if (!item.picked_up && item.position &&
                item.position[0] === userPos[0] && item.position[1] === userPos[1]) {
                if (item.can_pickup) {
                    this.state.user.inventory.push(item.unique_name);
                    item.picked_up = true;
                    pickedUpSomething = true;

                    if (item.item_type === 'item-heal') {
                        // Healing items restore a quarter of max health.
                        const maxHealth = 100;
                        const healAmount = Math.floor(maxHealth * 0.25);
                        const oldHealth = this.state.user.health;
                        this.state.user.health = Math.min(maxHealth, this.state.user.health + healAmount);
                        const actualHeal = this.state.user.health - oldHealth;
                        if (actualHeal > 0) {
                            this.showInteractionText(userPos[0], userPos[1], `Picked up ${item.unique_name}! Healed ${actualHeal} health!`);
                        } else {
                            this.showInteractionText(userPos[0], userPos[1], `Picked up ${item.unique_name}! (Already at full health)`);
                        }
                    } else {
                        this.showInteractionText(userPos[0], userPos[1], `Picked up ${item.unique_name}`);
                    }
                } else {
                    this.showInteractionText(userPos[0], userPos[1], item.catch_message);
                }
            }
        }

        if (pickedUpSomething) {
            this.checkEndGame();
        }
    }

    handleEnterKey() {
        const userPos = this.state.user.position;

        for (let monster of this.state.monsters) {
            if (!monster.defeated && monster.position) {
                const dx = Math.abs(monster.position[0] - userPos[0]);
                const dy = Math.abs(monster.position[1] - userPos[1]);
                if (dx <= 1 && dy <= 1 && (dx + dy) <= 1) {
                    this.attackMonster(monster);
                    return;
                }
            }
        }

        const panel = document.getElementById('dialog-panel');
        if (panel && panel.classList.contains('show')) {
            return;
        }

        for (let npc of this.state.npcs) {
            if (npc.position) {
                const dx = Math.abs(npc.position[0] - userPos[0]);
                const dy = Math.abs(npc.position[1] - userPos[1]);
                if (dx <= 1 && dy <= 1 && (dx + dy) <= 1) {
                    this.interactWithNPC(npc);
                    return;
                }
            }
        }
    }

    // Combat health bars appear for three seconds after the last hit.
    flashHealthBars(monster) {
        monster.showHealthBar = true;
        this.state.user.showHealthBar = true;
        if (monster.healthBarTimeout) clearTimeout(monster.healthBarTimeout);
        if (this.userHealthBarTimeout) clearTimeout(this.userHealthBarTimeout);
        monster.healthBarTimeout = setTimeout(() => {
            monster.showHealthBar = false;
        }, 3000);
        this.userHealthBarTimeout = setTimeout(() => {
            this.state.user.showHealthBar = false;
        }, 3000);
    }

    attackMonster(monster) {
        const damage = 1;
        this.flashHealthBars(monster);
        monster.health -= damage;

        if (monster.health <= 0) {
            monster.defeated = true;
            const expGained = monster.experience || 0;
            this.state.user.experience += expGained;
            this.showInteractionText(
                monster.position[0],
                monster.position[1],
                `You defeated ${monster.unique_name}! Gained ${expGained} experience!`
            );
            monster.position = null;
            monster.showHealthBar = false;
            if (monster.healthBarTimeout) clearTimeout(monster.healthBarTimeout);
        } else {
            // Counter-attack: bosses hit twice as hard.
            const counterDamage = monster.monster_type === 'monster-boss' ? 2 : 1;
            this.state.user.health -= counterDamage;
        }

        this.updateUI();
        this.checkEndGame();
    }

    interactWithNPC(npc) {
        const panel = document.getElementById('dialog-panel');
        if (this.currentDialogNPC && this.currentDialogNPC.unique_name === npc.unique_name &&
            panel.classList.contains('show')) {
            return;
        }

        if (!this.state.user.talked_to_npcs.includes(npc.unique_name)) {
            this.state.user.talked_to_npcs.push(npc.unique_name);
            this.evaluateQuests();
        }

        this.currentDialogNPC = npc;
        panel.classList.add('show');
        this.lastDialogOpenTime = Date.now();

        if (npc.npc_type === 'npc-static') {
            this.showStaticNPCDialog(npc);
        } else if (npc.npc_type === 'npc-dynamic') {
            this.showDynamicNPCDialog(npc);
        } else if (npc.npc_type === 'npc-state-machine') {
            this.showStateMachineNPCDialog(npc);
        }
    }

    showStaticNPCDialog(npc) {
        const content = document.getElementById('dialog-content');
        const input = document.getElementById('dialog-input');
        input.style.display = 'none';

        let response = npc.response;
        for (let condition of npc.conditions) {
            if (this.checkNPCCondition(condition) && condition.then_action === 'response') {
                response = condition.action_value;
                break;
            }
        }

        // A '|'-separated response picks one phrase at random.
        if (response && response.includes('|')) {
            const phrases = response.split('|').map(p => p.trim()).filter(p => p.length > 0);
            if (phrases.length > 0) {
                response = phrases[Math.floor(Math.random() * phrases.length)];
            }
        }

        content.innerHTML = `<h3>${npc.unique_name}</h3><p>${response}</p>`;
    }

    showDynamicNPCDialog(npc) {
        const content = document.getElementById('dialog-content');
        const input = document.getElementById('dialog-input');
        input.style.display = 'block';
        input.focus();

        if (!this.npcInteractionHistory[npc.unique_name]) {
            this.npcInteractionHistory[npc.unique_name] = [];
        }

        let initialMessage = '';
        if (npc.response) {
            initialMessage = `<p><strong>${npc.unique_name}:</strong> ${npc.response}</p>`;
        }
        content.innerHTML = `<h3>${npc.unique_name}</h3><div id="conversation">${initialMessage}</div>`;
    }

    showStateMachineNPCDialog(npc) {
        const content = document.getElementById('dialog-content');
        const input = document.getElementById('dialog-input');
        input.style.display = 'none';

        let response = npc.response || 'Hello!';
        if (npc.state_machine === 'idle') {
            response = 'I am idle.';
        }
        content.innerHTML = `<h3>${npc.unique_name}</h3><p>${response}</p>`;
    }

    handleDialogInput(message) {
        if (!this.currentDialogNPC || this.currentDialogNPC.npc_type !== 'npc-dynamic') {
            return;
        }

        const npc = this.currentDialogNPC;
        const conversationDiv = document.getElementById('conversation');
        conversationDiv.innerHTML += `<p><strong>You:</strong> ${message}</p>`;

        if (this.llmEndpoint && this.llmToken) {
            this.sendToLLM(npc, message, conversationDiv);
        } else {
            const fallback = npc.response || "I'm having trouble thinking right now. Can we talk later?";
            this.npcReplied(npc, conversationDiv, `<strong>${npc.unique_name}:</strong> ${fallback}`);
        }
    }

    // Record a reply and re-run anything that may depend on it.
    npcReplied(npc, conversationDiv, html) {
        conversationDiv.innerHTML += `<p>${html}</p>`;
        npc.has_responded = true;
        this.evaluateQuests();
        this.checkEndGame();
    }

    async sendToLLM(npc, message, conversationDiv) {
        try {
            const history = this.npcInteractionHistory[npc.unique_name] || [];
            history.push({role: 'user', content: message});

            const isLocalhost = this.llmEndpoint &&
                (this.llmEndpoint.includes('localhost') || this.llmEndpoint.includes('127.0.0.1'));
            const isFileProtocol = window.location.protocol === 'file:';

            // Browsers refuse file:// -> localhost fetches outright; fall
            // back to the static response instead of a guaranteed failure.
            if (isLocalhost && isFileProtocol) {
                if (npc.response) {
                    this.npcReplied(npc, conversationDiv, `<strong>${npc.unique_name}:</strong> ${npc.response}`);
                } else {
                    conversationDiv.innerHTML += `<p><strong>${npc.unique_name}:</strong> <em>Note: To use a localhost LLM, serve this HTML file from a local web server (e.g. python -m http.server) instead of opening it directly; CORS policy blocks file:// requests to localhost.</em></p>`;
                }
                return;
            }

            const systemPrompt = (npc.context || '') + (npc.agenda ? '\nAgenda: ' + npc.agenda : '');
            const fetchOptions = {
                method: 'POST',
                headers: {
                    'Content-Type': 'application/json',
                    'Authorization': `Bearer ${this.llmToken}`
                },
                body: JSON.stringify({
                    messages: [
                        {role: 'system', content: systemPrompt},
                        ...history.slice(-10)
                    ]
                })
            };
            if (isLocalhost) {
                fetchOptions.mode = 'cors';
            }

            const response = await fetch(this.llmEndpoint, fetchOptions);
            if (!response.ok) {
                throw new Error(`HTTP error! status: ${response.status}`);
            }

            const data = await response.json();
            const llmResponse = data.choices?.[0]?.message?.content || "I'm having trouble thinking right now.";
            history.push({role: 'assistant', content: llmResponse});
            this.npcReplied(npc, conversationDiv, `<strong>${npc.unique_name}:</strong> ${llmResponse}`);
        } catch (error) {
            console.error('LLM request error:', error);

            if (npc.response) {
                this.npcReplied(npc, conversationDiv, `<strong>${npc.unique_name}:</strong> ${npc.response}`);
                return;
            }

            let errorMsg = "I'm having trouble thinking right now. Can we talk later?";
            const errorStr = error.toString();
            if (errorStr.includes('CORS') || errorStr.includes('preflight')) {
                errorMsg = `CORS Error: The LLM server at ${this.llmEndpoint} needs to allow CORS from ${window.location.origin}.`;
            } else if (errorStr.includes('Failed to fetch') || errorStr.includes('ERR_FAILED')) {
                errorMsg = `Connection Error: Could not connect to the LLM server at ${this.llmEndpoint}.`;
            } else if (error.message) {
                errorMsg = `Error: ${error.message}`;
            }
            this.npcReplied(npc, conversationDiv, `<strong>${npc.unique_name}:</strong> <em style="color: #ff6b6b;">${errorMsg}</em>`);
        }
    }

    checkNPCCondition(condition) {
        if (condition.condition_type === 'item') {
            return this.state.user.inventory.includes(condition.value);
        } else if (condition.condition_type === 'experience') {
            return this.compareValues(this.state.user.experience, condition.operator, condition.value);
        } else if (condition.condition_type === 'health') {
            return this.compareValues(this.state.user.health, condition.operator, condition.value);
        }
        return false;
    }

    closeDialog() {
        // Key repeat can otherwise close the dialog the instant it opens.
        if (Date.now() - this.lastDialogOpenTime < 200) {
            return;
        }

        const panel = document.getElementById('dialog-panel');
        if (panel) {
            panel.classList.remove('show');
        }
        this.currentDialogNPC = null;
        this.lastDialogOpenTime = 0;
        const content = document.getElementById('dialog-content');
        if (content) {
            content.innerHTML = '';
        }
        const input = document.getElementById('dialog-input');
        if (input) {
            input.style.display = 'none';
            input.value = '';
        }
    }

    compareValues(a, op, b) {
        switch (op) {
            case '>': return a > b;
            case '<': return a < b;
            case '>=': return a >= b;
            case '<=': return a <= b;
            case '==': return a == b;
            case '!=': return a != b;
            default: return a == b;
        }
    }

    evaluateRules() {
        for (let rule of this.state.rules) {
            if (this.checkConditions(rule.conditions)) {
                this.executeAction(rule.action);
            }
        }
    }

    evaluateQuests() {
        for (let quest of this.state.quests) {
            if (!quest.completed && this.checkConditions(quest.conditions)) {
                this.executeAction(quest.action);
                quest.completed = true;
                quest.status = 'completed';
                this.checkEndGame();
            }
        }
    }

    checkConditions(conditions) {
        for (let condition of conditions) {
            if (!this.checkCondition(condition)) {
                return false;
            }
        }
        return true;
    }

    checkCondition(condition) {
        if (condition.type === 'position') {
            const entity = this.getEntity(condition.entity);
            if (!entity || !entity.position) return false;
            return entity.position[0] === condition.position[0] &&
                   entity.position[1] === condition.position[1];
        } else if (condition.type === 'has') {
            if (condition.entity === 'user' && typeof condition.value === 'string') {
                return this.state.user.inventory.includes(condition.value);
            }
        } else if (condition.type === 'talked_to') {
            if (condition.entity === 'user') {
                return this.state.user.talked_to_npcs.includes(condition.value);
            }
        } else if (condition.type === 'responded_to') {
            const npc = this.getEntity(condition.entity);
            return npc && npc.has_responded === true;
        } else if (condition.type === 'comparison') {
            if (condition.entity === 'user') {
                return this.compareValues(this.state.user.experience, condition.operator, condition.value) ||
                       this.compareValues(this.state.user.health, condition.operator, condition.value);
            }
            const entity = this.getEntity(condition.entity);
            if (!entity) return false;
            return this.compareValues(entity.health || 0, condition.operator, condition.value);
        }
        return false;
    }

    getEntity(name) {
        if (name === 'user') return this.state.user;
        for (let npc of this.state.npcs) {
            if (npc.unique_name === name) return npc;
        }
        for (let monster of this.state.monsters) {
            if (monster.unique_name === name) return monster;
        }
        for (let item of this.state.items) {
            if (item.unique_name === name) return item;
        }
        for (let mythic of this.state.mythics) {
            if (mythic.unique_name === name) return mythic;
        }
        return null;
    }

    executeAction(action) {
        if (action.type === 'level up') {
            this.state.user.level += 1;
            this.showInteractionText(
                this.state.user.position[0],
                this.state.user.position[1],
                'Level Up!'
            );
        }
        // 'talk' actions resolve through normal NPC interaction.
    }

    checkEndGame() {
        if (this.state.user.health <= 0) {
            this.endGame(false);
            return;
        }

        if (!this.state.end_game || !this.state.end_game.conditions) return;

        // Conditions are stored flattened; re-group them by result so
        // multi-condition clauses AND together.
        const winConditions = [];
        const loseConditions = [];
        for (let endCondition of this.state.end_game.conditions) {
            if (endCondition.result === 'win the game') {
                winConditions.push(endCondition.condition);
            } else if (endCondition.result === 'die and lose the game') {
                loseConditions.push(endCondition.condition);
            }
        }

        if (winConditions.length > 0 && winConditions.every(c => this.checkCondition(c))) {
            this.endGame(true);
            return;
        }
        if (loseConditions.length > 0 && loseConditions.every(c => this.checkCondition(c))) {
            this.endGame(false);
        }
    }

    endGame(won) {
        const endGame = this.state.end_game || {};
        const message = won ?
            (endGame.win_message || 'You won!') :
            (endGame.lose_message || 'You lost!');
        alert(message);
    }

    centerOnUser() {
        this.viewportX = Math.max(0, Math.min(this.state.user.position[0], this.state.world.width - 1));
        this.viewportY = Math.max(0, Math.min(this.state.user.position[1], this.state.world.height - 1));
    }

    zoomIn() {
        this.zoom = Math.min(this.zoom * 1.2, 3.0);
    }

    zoomOut() {
        this.zoom = Math.max(this.zoom / 1.2, 0.5);
    }

    showInteractionText(x, y, text) {
        const textObj = { x: x, y: y, text: text, time: Date.now() };
        this.interactionTexts.push(textObj);
        setTimeout(() => {
            const index = this.interactionTexts.indexOf(textObj);
            if (index > -1) this.interactionTexts.splice(index, 1);
        }, 2000);
    }

    updateUI() {
        const statusContent = document.getElementById('status-content');
        statusContent.innerHTML = `
            <div>Health: ${this.state.user.health}</div>
            <div>Experience: ${this.state.user.experience}</div>
            <div>Level: ${this.state.user.level}</div>
            <div>Position: (${this.state.user.position[0]}, ${this.state.user.position[1]})</div>
        `;

        const inventoryContent = document.getElementById('inventory-content');
        if (this.state.user.inventory.length === 0) {
            inventoryContent.innerHTML = '<div>Inventory is empty</div>';
        } else {
            inventoryContent.innerHTML = this.state.user.inventory.map(item => `<div>${item}</div>`).join('');
        }

        const chatContent = document.getElementById('chat-content');
        const chatLines = [];
        for (let npc of this.state.npcs) {
            const history = this.npcInteractionHistory[npc.unique_name] || [];
            for (let entry of history) {
                const speaker = entry.role === 'user' ? 'You' : npc.unique_name;
                chatLines.push(`<div><strong>${speaker}:</strong> ${entry.content}</div>`);
            }
        }
        chatContent.innerHTML = chatLines.length ? chatLines.join('') : '<div>No conversations yet</div>';

        const questContent = document.getElementById('quest-content');
        if (this.state.quests.length === 0) {
            questContent.innerHTML = '<div>No quests</div>';
        } else {
            questContent.innerHTML = this.state.quests.map(quest =>
                `<div><strong>Quest ${quest.id}</strong>: ${quest.status}</div>`
            ).join('<hr>');
        }
    }

    render() {
        this.ctx.clearRect(0, 0, this.canvas.width, this.canvas.height);

        const cellSize = this.cellSize * this.zoom;
        const centerX = this.canvas.width / 2;
        const centerY = this.canvas.height / 2;

        const viewWidth = Math.ceil(this.canvas.width / cellSize) + 2;
        const viewHeight = Math.ceil(this.canvas.height / cellSize) + 2;
        const startX = Math.max(0, Math.floor(this.viewportX - viewWidth / 2));
        const startY = Math.max(0, Math.floor(this.viewportY - viewHeight / 2));
        const endX = Math.min(this.state.world.width, startX + viewWidth);
        const endY = Math.min(this.state.world.height, startY + viewHeight);

        const toScreen = (x, y) => [
            centerX + (x - this.viewportX) * cellSize,
            centerY + (y - this.viewportY) * cellSize
        ];
        const onScreen = (sx, sy) =>
            sx >= -cellSize && sx <= this.canvas.width + cellSize &&
            sy >= -cellSize && sy <= this.canvas.height + cellSize;

        // Base terrain.
        this.ctx.fillStyle = '#4a7c59';
        for (let y = startY; y < endY; y++) {
            for (let x = startX; x < endX; x++) {
                const [sx, sy] = toScreen(x, y);
                this.ctx.fillRect(sx, sy, cellSize, cellSize);
            }
        }

        for (let furniture of this.state.furniture) {
            let positions = [];
            if (furniture.placement.type === 'coordinate') {
                positions = [furniture.placement.coord];
            } else if (furniture.placement.type === 'range') {
                const [c1, c2] = [furniture.placement.coord1, furniture.placement.coord2];
                const minX = Math.min(c1[0], c2[0]), maxX = Math.max(c1[0], c2[0]);
                const minY = Math.min(c1[1], c2[1]), maxY = Math.max(c1[1], c2[1]);
                for (let fx = minX; fx <= maxX; fx++) {
                    for (let fy = minY; fy <= maxY; fy++) {
                        positions.push([fx, fy]);
                    }
                }
            }

            let emoji = '🏠';
            if (furniture.name === 'wall' || furniture.name === 'stone') {
                emoji = '🧱';
            } else if (furniture.name === 'grass') {
                emoji = '🟩';
            }

            for (let pos of positions) {
                const [sx, sy] = toScreen(pos[0], pos[1]);
                if (onScreen(sx, sy)) {
                    this.ctx.font = `${cellSize * 0.8}px Arial`;
                    this.ctx.fillText(emoji, sx, sy + cellSize * 0.8);
                }
            }
        }

        for (let item of this.state.items) {
            if (!item.picked_up && item.position) {
                const [sx, sy] = toScreen(item.position[0], item.position[1]);
                if (onScreen(sx, sy)) {
                    this.ctx.font = `${cellSize * 0.8}px Arial`;
                    this.ctx.fillText('💎', sx, sy + cellSize * 0.8);
                }
            }
        }

        for (let mythic of this.state.mythics) {
            if (!mythic.picked_up && mythic.position) {
                const [sx, sy] = toScreen(mythic.position[0], mythic.position[1]);
                if (onScreen(sx, sy)) {
                    this.ctx.font = `${cellSize * 0.8}px Arial`;
                    this.ctx.fillText('💠', sx, sy + cellSize * 0.8);
                }
            }
        }

        for (let monster of this.state.monsters) {
            if (!monster.defeated && monster.position) {
                const [sx, sy] = toScreen(monster.position[0], monster.position[1]);
                if (onScreen(sx, sy)) {
                    // Bosses render four times larger.
                    const isBoss = monster.monster_type === 'monster-boss';
                    const fontSize = isBoss ? cellSize * 3.2 : cellSize * 0.8;
                    this.ctx.font = `${fontSize}px Arial`;
                    const emoji = (monster.monster_type === 'monster-dynamic' || isBoss) ? '💀' : '👹';
                    this.ctx.fillText(emoji, sx, sy + fontSize);

                    if (monster.showHealthBar) {
                        const barY = isBoss ? sy - 40 : sy - 10;
                        const barSize = isBoss ? cellSize * 4 : cellSize;
                        this.drawHealthBar(sx, barY, monster.health, monster.max_health, barSize);
                    }
                }
            }
        }

        for (let npc of this.state.npcs) {
            if (npc.position) {
                const [sx, sy] = toScreen(npc.position[0], npc.position[1]);
                if (onScreen(sx, sy)) {
                    this.ctx.font = `${cellSize * 0.8}px Arial`;
                    this.ctx.fillText(npc.emoji, sx, sy + cellSize * 0.8);
                }
            }
        }

        const [ux, uy] = toScreen(this.state.user.position[0], this.state.user.position[1]);
        this.ctx.font = `${cellSize * 0.8}px Arial`;
        this.ctx.fillText('🧙', ux, uy + cellSize * 0.8);
        if (this.state.user.showHealthBar) {
            this.drawHealthBar(ux, uy - 10, this.state.user.health, 100, cellSize);
        }

        for (let textObj of this.interactionTexts) {
            const [sx, sy] = toScreen(textObj.x, textObj.y);
            this.ctx.fillStyle = '#fff';
            this.ctx.font = '12px Arial';
            this.ctx.fillText(textObj.text, sx, sy - 20);
            this.ctx.fillStyle = '#000';
        }
    }

    drawHealthBar(x, y, currentHealth, maxHealth, cellSize) {
        const barWidth = cellSize * 0.8;
        const barHeight = 6;
        const healthPercent = Math.max(0, Math.min(1, currentHealth / maxHealth));

        this.ctx.fillStyle = '#333';
        this.ctx.fillRect(x - barWidth / 2, y, barWidth, barHeight);

        if (healthPercent > 0.5) {
            this.ctx.fillStyle = '#0f0';
        } else if (healthPercent > 0.25) {
            this.ctx.fillStyle = '#ff0';
        } else {
            this.ctx.fillStyle = '#f00';
        }
        this.ctx.fillRect(x - barWidth / 2, y, barWidth * healthPercent, barHeight);

        this.ctx.strokeStyle = '#fff';
        this.ctx.lineWidth = 1;
        this.ctx.strokeRect(x - barWidth / 2, y, barWidth, barHeight);
    }

    gameLoop() {
        this.updateDynamicMonsters();
        this.render();
        requestAnimationFrame(() => this.gameLoop());
    }

    // Dynamic and boss monsters chase the player when within ten cells and
    // attack on contact with a three-second cooldown.
    updateDynamicMonsters() {
        const heroPos = this.state.user.position;
        const currentTime = Date.now();

        for (let monster of this.state.monsters) {
            const chases = monster.monster_type === 'monster-dynamic' || monster.monster_type === 'monster-boss';
            if (!chases || monster.defeated || !monster.position) continue;

            const dx = heroPos[0] - monster.position[0];
            const dy = heroPos[1] - monster.position[1];
            const distance = Math.sqrt(dx * dx + dy * dy);
            const isAdjacent = Math.abs(dx) <= 1 && Math.abs(dy) <= 1 && (Math.abs(dx) + Math.abs(dy)) <= 1;

            if (isAdjacent) {
                if (!monster.lastAttackTime) {
                    monster.lastAttackTime = 0;
                }
                if (currentTime - monster.lastAttackTime >= 3000) {
                    monster.lastAttackTime = currentTime;
                    this.flashHealthBars(monster);
                    const damage = monster.monster_type === 'monster-boss' ? 2 : 1;
                    this.state.user.health -= damage;
                    if (this.state.user.health <= 0) {
                        this.checkEndGame();
                    }
                    this.updateUI();
                }
            } else if (distance <= 10 && distance > 0) {
                // Step once every ten frames so the chase feels walkable.
                monster.moveCounter = (monster.moveCounter || 0) + 1;
                if (monster.moveCounter >= 10) {
                    monster.moveCounter = 0;
                    let newX = monster.position[0];
                    let newY = monster.position[1];
                    if (Math.abs(dx) > Math.abs(dy)) {
                        newX += dx > 0 ? 1 : -1;
                    } else {
                        newY += dy > 0 ? 1 : -1;
                    }
                    if (this.canMonsterMoveTo(newX, newY)) {
                        monster.position[0] = newX;
                        monster.position[1] = newY;
                    }
                }
            }
        }
    }

    canMonsterMoveTo(x, y) {
        if (x < 0 || x >= this.state.world.width ||
            y < 0 || y >= this.state.world.height) {
            return false;
        }
        if (this.blockedByFurniture(x, y)) return false;
        // Monsters may overlap each other but never the player's cell.
        if (this.state.user.position[0] === x && this.state.user.position[1] === y) {
            return false;
        }
        return true;
    }

    saveGame() {
        const saveData = {
            version: '1.0',
            timestamp: new Date().toISOString(),
            game_state: this.state
        };
        const blob = new Blob([JSON.stringify(saveData, null, 2)], {type: 'application/json'});
        const url = URL.createObjectURL(blob);
        const a = document.createElement('a');
        a.href = url;
        a.download = 'game_save.json';
        a.click();
        URL.revokeObjectURL(url);
    }

    loadGame(event) {
        const file = event.target.files[0];
        if (!file) return;

        const reader = new FileReader();
        reader.onload = (e) => {
            try {
                const saveData = JSON.parse(e.target.result);
                this.state = saveData.game_state;
                this.updateUI();
                alert('Game loaded successfully');
            } catch (error) {
                alert('Failed to load game: ' + error.message);
            }
        };
        reader.readAsText(file);
    }

    showSplashScreen() {
        if (!this.state.on_game_start || !this.state.on_game_start.title) {
            return;
        }

        const splashScreen = document.getElementById('splash-screen');
        const splashTitle = document.getElementById('splash-title');
        const splashText = document.getElementById('splash-text');
        if (!splashScreen || !splashTitle || !splashText) return;

        splashTitle.textContent = this.state.on_game_start.title;
        splashText.innerHTML = '';

        for (let text of (this.state.on_game_start.text_lines || [])) {
            const p = document.createElement('p');
            p.textContent = text;
            splashText.appendChild(p);
        }

        const links = this.state.on_game_start.links || [];
        if (links.length > 0) {
            const linksDiv = document.createElement('div');
            linksDiv.style.cssText = 'margin-top: 20px; display: flex; flex-wrap: wrap; gap: 15px; justify-content: center;';
            for (let [anchorText, url] of links) {
                const a = document.createElement('a');
                a.href = url;
                a.textContent = anchorText;
                a.target = '_blank';
                a.rel = 'noopener noreferrer';
                a.style.cssText = 'color: #ffd700; text-decoration: none; padding: 8px 16px; border: 2px solid #ffd700; border-radius: 5px; transition: all 0.3s; display: inline-block;';
                a.onmouseenter = function() {
                    this.style.background = '#ffd700';
                    this.style.color = '#1e3c72';
                };
                a.onmouseleave = function() {
                    this.style.background = 'transparent';
                    this.style.color = '#ffd700';
                };
                linksDiv.appendChild(a);
            }
            splashText.appendChild(linksDiv);
        }

        splashScreen.classList.add('show');
    }

    closeSplashScreen() {
        const splashScreen = document.getElementById('splash-screen');
        if (splashScreen) {
            splashScreen.classList.remove('show');
        }
    }
}

let game;
window.addEventListener('load', () => {
    game = new DungeonGame();
});
"##;
